//! 로그인 세션 관리자.
//!
//! 플랫폼별 로그인 상태의 단일 소유자. 스토어 읽기/쓰기, 검증, 활동 타이머,
//! 상태 변경 알림을 조율한다.
//!
//! # 동시성
//! - 같은 플랫폼의 read-modify-write는 플랫폼별 `tokio::sync::Mutex`로 직렬화
//! - 메모리 상태는 스토어 쓰기가 성공한 뒤에만 갱신
//! - 로그아웃은 플랫폼 잠금을 쥔 채 레코드 삭제와 타이머 중지를 마친다.
//!   늦게 도착한 타이머 틱은 잠금을 얻은 뒤 레코드 부재를 보고 종료한다.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use reelgate_core::config::{AppConfig, SessionConfig};
use reelgate_core::error::CoreError;
use reelgate_core::keys;
use reelgate_core::models::backup::RestoreResult;
use reelgate_core::models::health::{
    format_duration, Diagnostics, ExportEntry, HealthLevel, LoginExport, LoginStats,
    LoginSuggestion, PlatformStats, SessionHealth, SuggestionPriority,
};
use reelgate_core::models::platform::Platform;
use reelgate_core::models::session::{LoginMetadata, LoginStates, SessionRecord, APP_VERSION};
use reelgate_core::ports::clock::Clock;
use reelgate_core::ports::storage::KeyValueStore;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::listeners::{ListenerRegistry, Subscription};
use crate::timers::ActivityTimers;
use crate::validator::{validate, InvalidReason, SessionPolicy, Verdict};

/// 로그인 내보내기 포맷 버전
pub const EXPORT_FORMAT_VERSION: &str = "2.0";

/// 플랫폼 하나의 검증 결과 (읽기 전용)
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCheck {
    pub platform: Platform,
    /// 저장된 레코드 (없거나 해석 불가면 None)
    pub record: Option<SessionRecord>,
    pub verdict: Verdict,
}

impl SessionCheck {
    fn missing(platform: Platform) -> Self {
        Self {
            platform,
            record: None,
            verdict: Verdict::Invalid(InvalidReason::Missing),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }

    /// 스토어에 정리할 무효 레코드가 남아 있는지
    pub fn needs_invalidation(&self) -> bool {
        self.verdict
            .reason()
            .is_some_and(InvalidReason::has_stored_record)
    }
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
    config: SessionConfig,
    activity_interval: std::time::Duration,
    states: RwLock<LoginStates>,
    locks: [Mutex<()>; 3],
    listeners: ListenerRegistry,
    timers: ActivityTimers,
}

/// 세션 관리자 — 복제 시 같은 상태를 공유한다
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// 새 세션 관리자 생성
    ///
    /// 모든 플랫폼은 로그아웃 상태로 시작한다. 저장된 세션은 `load_all`로 읽는다.
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                clock,
                policy: SessionPolicy::from_config(&config.session),
                config: config.session.clone(),
                activity_interval: config.monitor.activity_interval(),
                states: RwLock::new(LoginStates::default()),
                locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
                listeners: ListenerRegistry::new(),
                timers: ActivityTimers::new(),
            }),
        }
    }

    // ============================================================
    // 조회
    // ============================================================

    /// 플랫폼 하나를 읽고 검증 (부작용 없음)
    pub async fn inspect(&self, platform: Platform) -> SessionCheck {
        let now = self.inner.clock.now();
        let raw = match self.inner.store.get(&keys::login(platform)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%platform, "세션 레코드 읽기 실패 — 세션 없음으로 처리: {e}");
                None
            }
        };

        let Some(raw) = raw else {
            return SessionCheck::missing(platform);
        };

        match SessionRecord::from_json(&raw) {
            Err(e) => {
                warn!(%platform, "세션 레코드 해석 실패: {e}");
                SessionCheck {
                    platform,
                    record: None,
                    verdict: Verdict::Invalid(InvalidReason::Malformed),
                }
            }
            Ok(record) if record.platform != platform => {
                warn!(%platform, stored = %record.platform, "다른 플랫폼의 세션 레코드");
                SessionCheck {
                    platform,
                    record: Some(record),
                    verdict: Verdict::Invalid(InvalidReason::PlatformMismatch),
                }
            }
            Ok(record) => {
                let verdict = validate(&record, now, &self.inner.policy);
                SessionCheck {
                    platform,
                    record: Some(record),
                    verdict,
                }
            }
        }
    }

    /// 전체 플랫폼 검증 (부작용 없음)
    pub async fn check_all(&self) -> BTreeMap<Platform, SessionCheck> {
        join_all(Platform::ALL.map(|p| self.inspect(p)))
            .await
            .into_iter()
            .map(|check| (check.platform, check))
            .collect()
    }

    /// 저장된 레코드 (해석 불가/읽기 실패면 None)
    pub async fn get_record(&self, platform: Platform) -> Option<SessionRecord> {
        match self.read_record(platform).await {
            Ok(record) => record,
            Err(e) => {
                warn!(%platform, "세션 레코드 읽기 실패: {e}");
                None
            }
        }
    }

    /// 현재 시각 기준 유효성
    pub fn is_valid(&self, record: &SessionRecord) -> bool {
        validate(record, self.inner.clock.now(), &self.inner.policy).is_valid()
    }

    /// 메모리 상의 로그인 상태
    pub fn login_states(&self) -> LoginStates {
        *self.inner.states.read()
    }

    pub fn is_logged_in(&self, platform: Platform) -> bool {
        self.inner.states.read().get(platform)
    }

    pub fn logged_in_count(&self) -> usize {
        self.inner.states.read().logged_in_count()
    }

    pub fn all_logged_in(&self) -> bool {
        self.inner.states.read().all_logged_in()
    }

    pub fn any_logged_in(&self) -> bool {
        self.inner.states.read().any_logged_in()
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.inner.policy
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    pub(crate) fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    /// 동작 중인 활동 타이머
    pub fn active_timers(&self) -> Vec<Platform> {
        self.inner.timers.active()
    }

    // ============================================================
    // 적재
    // ============================================================

    /// 전체 플랫폼 적재
    ///
    /// 플랫폼마다 독립적으로 검증하고, 무효 레코드는 삭제한다.
    /// 유효한 세션은 활동 타이머를 시작한다. 구독자 알림은 마지막에 한 번.
    pub async fn load_all(&self) -> LoginStates {
        let results = join_all(Platform::ALL.map(|p| self.load_platform(p))).await;

        let mut states = LoginStates::default();
        for (platform, valid) in results {
            states.set(platform, valid);
        }
        *self.inner.states.write() = states;

        info!(
            youtube = states.youtube,
            tiktok = states.tiktok,
            instagram = states.instagram,
            "로그인 상태 적재 완료"
        );
        self.notify();
        states
    }

    async fn load_platform(&self, platform: Platform) -> (Platform, bool) {
        let _guard = self.lock(platform).await;
        let check = self.inspect(platform).await;

        if check.is_valid() {
            if let Some(record) = &check.record {
                self.start_activity_timer(platform, record.session_id.clone());
            }
            return (platform, true);
        }

        if check.needs_invalidation() {
            info!(%platform, reason = ?check.verdict.reason(), "무효 세션 정리");
            if let Err(e) = self.remove_record(platform).await {
                warn!(%platform, "무효 세션 삭제 실패: {e}");
            }
        } else {
            self.inner.timers.stop(platform);
        }
        (platform, false)
    }

    // ============================================================
    // 변경
    // ============================================================

    /// 로그인 상태 저장
    ///
    /// `true`면 새 세션 레코드(새 session_id, login_time = now)로 기존 레코드를 교체하고
    /// 복구 카운터를 지운다. `false`면 `logout`과 같다.
    pub async fn set_login_status(
        &self,
        platform: Platform,
        logged_in: bool,
        metadata: LoginMetadata,
    ) -> Result<(), CoreError> {
        if !logged_in {
            return self.logout(platform).await;
        }

        let record = {
            let _guard = self.lock(platform).await;
            self.store_login_locked(platform, metadata).await?
        };

        info!(
            %platform,
            session_id = %record.session_id,
            login_method = %record.metadata.login_method,
            "로그인 상태 저장"
        );
        self.notify();
        Ok(())
    }

    /// 백업 복원용 로그인
    ///
    /// 유효성 확인과 쓰기를 같은 플랫폼 잠금 안에서 처리한다.
    /// 유효한 세션이 이미 있으면 건드리지 않고 `SkippedActive`.
    pub async fn restore_login(
        &self,
        platform: Platform,
        metadata: LoginMetadata,
    ) -> Result<RestoreResult, CoreError> {
        let record = {
            let _guard = self.lock(platform).await;
            if self.inspect(platform).await.is_valid() {
                debug!(%platform, "유효한 세션 존재 — 복원 건너뜀");
                return Ok(RestoreResult::SkippedActive);
            }
            self.store_login_locked(platform, metadata).await?
        };

        info!(%platform, session_id = %record.session_id, "백업에서 세션 복원");
        self.notify();
        Ok(RestoreResult::Restored)
    }

    /// 로그아웃 (멱등)
    pub async fn logout(&self, platform: Platform) -> Result<(), CoreError> {
        {
            let _guard = self.lock(platform).await;
            if let Err(e) = self.remove_record(platform).await {
                error!(%platform, "로그아웃 실패: {e}");
                return Err(e);
            }
            self.set_state(platform, false);
        }

        info!(%platform, "로그아웃");
        self.notify();
        Ok(())
    }

    /// 전체 로그아웃
    ///
    /// 한 플랫폼의 삭제 실패가 나머지 시도를 막지 않는다. 첫 에러를 반환한다.
    pub async fn logout_all(&self) -> Result<(), CoreError> {
        let mut first_error = None;

        for platform in Platform::ALL {
            let _guard = self.lock(platform).await;
            match self.remove_record(platform).await {
                Ok(()) => {
                    self.set_state(platform, false);
                }
                Err(e) => {
                    error!(%platform, "로그아웃 실패: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        info!("전체 로그아웃");
        self.notify();
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// 세션 갱신 (`last_activity = renewed_at = now`)
    ///
    /// 로그인된 레코드가 없으면 `Ok(false)`.
    pub async fn renew_session(&self, platform: Platform) -> Result<bool, CoreError> {
        let now = self.inner.clock.now();

        let changed = {
            let _guard = self.lock(platform).await;
            let Some(mut record) = self.read_record(platform).await? else {
                debug!(%platform, "갱신할 세션 없음");
                return Ok(false);
            };
            if !record.is_logged_in {
                return Ok(false);
            }

            record.last_activity = Some(now);
            record.renewed_at = Some(now);
            if let Err(e) = self.write_record(&record).await {
                error!(%platform, "세션 갱신 저장 실패: {e}");
                return Err(e);
            }

            let valid = validate(&record, now, &self.inner.policy).is_valid();
            if valid && !self.inner.timers.is_running(platform) {
                self.start_activity_timer(platform, record.session_id.clone());
            }
            info!(%platform, session_id = %record.session_id, "세션 갱신");
            self.set_state(platform, valid) != valid
        };

        if changed {
            self.notify();
        }
        Ok(true)
    }

    /// 복구에 실패한 플랫폼을 로그아웃 상태로 표시
    ///
    /// 잠금 안에서 다시 검증해 여전히 무효일 때만 타이머를 멈추고 상태를 내린다.
    /// 레코드와 복구 카운터는 남겨 다음 실행의 자동 복구에 맡긴다.
    /// 상태가 바뀌었으면 `true`.
    pub async fn mark_unrecoverable(&self, platform: Platform) -> bool {
        let changed = {
            let _guard = self.lock(platform).await;
            if self.inspect(platform).await.is_valid() {
                return false;
            }
            self.inner.timers.stop(platform);
            self.set_state(platform, false)
        };

        if changed {
            info!(%platform, "복구 불가 세션 — 로그아웃 상태로 전환");
            self.notify();
        }
        changed
    }

    /// 활동 시각 갱신 (갱신으로 취급하지 않음)
    ///
    /// 로그인된 레코드가 없으면 `Ok(false)`.
    pub async fn update_activity(&self, platform: Platform) -> Result<bool, CoreError> {
        let _guard = self.lock(platform).await;
        self.touch_locked(platform, None).await
    }

    // ============================================================
    // 구독
    // ============================================================

    /// 상태 변경 구독. 반환된 핸들로 해지한다.
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LoginStates) + Send + Sync + 'static,
    {
        self.inner.listeners.add(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    // ============================================================
    // 리포트
    // ============================================================

    /// 플랫폼별 세션 통계
    pub async fn login_stats(&self) -> LoginStats {
        let now = self.inner.clock.now();
        let mut platforms = BTreeMap::new();

        for platform in Platform::ALL {
            let stats = match self.get_record(platform).await {
                Some(record) => self.platform_stats(&record, now),
                None => PlatformStats::absent(platform),
            };
            platforms.insert(platform, stats);
        }

        let states = self.login_states();
        LoginStats {
            platforms,
            total_logged_in: states.logged_in_count(),
            all_logged_in: states.all_logged_in(),
            any_logged_in: states.any_logged_in(),
            last_checked: now,
        }
    }

    fn platform_stats(&self, record: &SessionRecord, now: DateTime<Utc>) -> PlatformStats {
        let max_age = self.inner.policy.max_session_age(record.platform);
        let anchor_age = now - record.age_anchor();

        PlatformStats {
            platform: record.platform,
            is_logged_in: record.is_logged_in,
            login_time: Some(record.login_time),
            last_activity: record.last_activity,
            session_age_secs: (now - record.login_time).num_seconds(),
            last_activity_age_secs: record.last_activity.map(|t| (now - t).num_seconds()),
            session_id: Some(record.session_id.clone()),
            login_method: Some(record.metadata.login_method.clone()),
            is_expired: anchor_age > max_age,
            time_to_expiry_secs: (max_age - anchor_age).num_seconds(),
        }
    }

    /// 세션 건강 리포트 (읽기 전용)
    ///
    /// 만료 임박 또는 장시간 비활성이면 이슈. 이슈가 하나라도 있으면 warning,
    /// 임계치를 넘으면 critical.
    pub async fn session_health(&self) -> SessionHealth {
        let stats = self.login_stats().await;
        let expiry_warning = Duration::days(i64::from(self.inner.config.expiry_warning_days));
        let idle_warning = Duration::hours(i64::from(self.inner.config.inactivity_warning_hours));

        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        for s in stats.platforms.values().filter(|s| s.is_logged_in) {
            let remaining = s.time_to_expiry();
            if remaining < expiry_warning {
                if remaining <= Duration::zero() {
                    issues.push(format!("{}: 세션 만료됨", s.platform));
                } else {
                    issues.push(format!(
                        "{}: 세션이 {} 후 만료됩니다",
                        s.platform,
                        format_duration(remaining)
                    ));
                }
                recommendations.push(format!("{} 세션을 갱신하세요", s.platform));
            }

            if let Some(idle) = s.last_activity_age() {
                if idle > idle_warning {
                    issues.push(format!(
                        "{}: 장시간 비활성 ({})",
                        s.platform,
                        format_duration(idle)
                    ));
                }
            }
        }

        let overall = if issues.len() > self.inner.config.critical_issue_threshold {
            HealthLevel::Critical
        } else if !issues.is_empty() {
            HealthLevel::Warning
        } else {
            HealthLevel::Healthy
        };

        SessionHealth {
            overall,
            issues,
            recommendations,
        }
    }

    /// 비민감 필드 내보내기 (session_id 제외) + SHA-256 체크섬
    pub async fn export_login_data(&self) -> Result<LoginExport, CoreError> {
        let now = self.inner.clock.now();
        let mut login_data = BTreeMap::new();

        for platform in Platform::ALL {
            if let Some(record) = self.read_record(platform).await? {
                login_data.insert(
                    platform,
                    ExportEntry {
                        platform,
                        is_logged_in: record.is_logged_in,
                        login_time: record.login_time,
                        last_activity: record.last_activity,
                        app_version: record.metadata.app_version,
                        login_method: record.metadata.login_method,
                    },
                );
            }
        }

        let checksum = export_checksum(&login_data)?;
        let total_logins = login_data.values().filter(|e| e.is_logged_in).count();

        Ok(LoginExport {
            export_date: now,
            export_version: EXPORT_FORMAT_VERSION.to_string(),
            app_version: APP_VERSION.to_string(),
            login_data,
            total_logins,
            checksum,
        })
    }

    /// 로그인된 모든 플랫폼 세션 갱신
    pub async fn refresh_all_sessions(&self) -> BTreeMap<Platform, bool> {
        let mut results = BTreeMap::new();
        for platform in Platform::ALL.into_iter().filter(|p| self.is_logged_in(*p)) {
            let renewed = match self.renew_session(platform).await {
                Ok(renewed) => renewed,
                Err(e) => {
                    warn!(%platform, "세션 일괄 갱신 실패: {e}");
                    false
                }
            };
            results.insert(platform, renewed);
        }
        info!(?results, "세션 일괄 갱신");
        results
    }

    /// 유효한 세션이 없는 플랫폼의 로그인 제안 (우선순위 내림차순)
    pub async fn login_suggestions(&self) -> Vec<LoginSuggestion> {
        let now = self.inner.clock.now();
        let mut suggestions = Vec::new();

        for check in self.check_all().await.into_values() {
            if check.is_valid() {
                continue;
            }

            let suggestion = match check.record {
                Some(record) => {
                    let days = (now - record.login_time).num_days().max(0);
                    let priority = if days < 3 {
                        SuggestionPriority::High
                    } else if days < 7 {
                        SuggestionPriority::Medium
                    } else {
                        SuggestionPriority::Low
                    };
                    LoginSuggestion {
                        platform: check.platform,
                        priority,
                        days_since_login: Some(days),
                        reason: login_reason(days),
                    }
                }
                None => LoginSuggestion {
                    platform: check.platform,
                    priority: SuggestionPriority::Medium,
                    days_since_login: None,
                    reason: "아직 로그인한 적 없음".to_string(),
                },
            };
            suggestions.push(suggestion);
        }

        suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
        suggestions
    }

    /// 저장소/타이머/구독 진단 정보
    pub async fn diagnostics(&self) -> Result<Diagnostics, CoreError> {
        let managed_keys: Vec<String> = self
            .inner
            .store
            .list_keys()
            .await?
            .into_iter()
            .filter(|k| keys::is_managed(k))
            .collect();

        let mut record_bytes = BTreeMap::new();
        let mut total_bytes = 0;
        for key in &managed_keys {
            let Some(value) = self.inner.store.get(key).await? else {
                continue;
            };
            total_bytes += value.len();
            if let Some(platform) = Platform::ALL.into_iter().find(|p| keys::login(*p) == *key) {
                record_bytes.insert(platform, value.len());
            }
        }

        Ok(Diagnostics {
            managed_keys,
            record_bytes,
            total_bytes,
            active_timers: self.inner.timers.active(),
            listener_count: self.inner.listeners.len(),
        })
    }

    /// 종료 정리 — 모든 타이머 중지, 구독 해지
    pub fn cleanup(&self) {
        self.inner.timers.stop_all();
        self.inner.listeners.clear();
        info!("세션 관리자 정리 완료");
    }

    // ============================================================
    // 내부
    // ============================================================

    async fn lock(&self, platform: Platform) -> MutexGuard<'_, ()> {
        self.inner.locks[platform.index()].lock().await
    }

    /// 레코드 읽기 — 해석 불가/플랫폼 불일치는 None, 스토어 에러는 전파
    async fn read_record(&self, platform: Platform) -> Result<Option<SessionRecord>, CoreError> {
        let Some(raw) = self.inner.store.get(&keys::login(platform)).await? else {
            return Ok(None);
        };
        match SessionRecord::from_json(&raw) {
            Ok(record) if record.platform == platform => Ok(Some(record)),
            Ok(record) => {
                warn!(%platform, stored = %record.platform, "다른 플랫폼의 세션 레코드 무시");
                Ok(None)
            }
            Err(e) => {
                warn!(%platform, "세션 레코드 해석 실패 — 세션 없음으로 처리: {e}");
                Ok(None)
            }
        }
    }

    async fn write_record(&self, record: &SessionRecord) -> Result<(), CoreError> {
        let raw = record.to_json()?;
        self.inner
            .store
            .set(&keys::login(record.platform), &raw)
            .await
    }

    /// 새 세션 레코드 저장 + 타이머 시작 + 카운터 정리 (플랫폼 잠금 안에서 호출)
    async fn store_login_locked(
        &self,
        platform: Platform,
        metadata: LoginMetadata,
    ) -> Result<SessionRecord, CoreError> {
        let record = SessionRecord::new(
            platform,
            new_session_id(platform),
            self.inner.clock.now(),
            metadata.into_session_metadata(),
        );
        if let Err(e) = self.write_record(&record).await {
            error!(%platform, "세션 저장 실패: {e}");
            return Err(e);
        }
        self.start_activity_timer(platform, record.session_id.clone());
        self.clear_recovery_attempts(platform).await;
        self.set_state(platform, true);
        Ok(record)
    }

    /// 레코드 삭제 + 타이머 중지 (플랫폼 잠금 안에서 호출)
    async fn remove_record(&self, platform: Platform) -> Result<(), CoreError> {
        self.inner.store.remove(&keys::login(platform)).await?;
        self.inner.timers.stop(platform);
        Ok(())
    }

    /// 활동 시각 갱신 (플랫폼 잠금 안에서 호출)
    ///
    /// `session_id`가 주어지면 해당 세션일 때만 갱신한다.
    async fn touch_locked(
        &self,
        platform: Platform,
        session_id: Option<&str>,
    ) -> Result<bool, CoreError> {
        let Some(mut record) = self.read_record(platform).await? else {
            return Ok(false);
        };
        if !record.is_logged_in || session_id.is_some_and(|id| id != record.session_id) {
            return Ok(false);
        }

        record.last_activity = Some(self.inner.clock.now());
        self.write_record(&record).await?;
        debug!(%platform, "활동 시각 갱신");
        Ok(true)
    }

    fn start_activity_timer(&self, platform: Platform, session_id: String) {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .timers
            .start(platform, self.inner.activity_interval, move || {
                let weak = weak.clone();
                let session_id = session_id.clone();
                async move {
                    let Some(inner) = weak.upgrade() else {
                        return false;
                    };
                    SessionManager { inner }
                        .activity_tick(platform, &session_id)
                        .await
                }
            });
    }

    /// 타이머 틱 — 세션이 사라졌거나 바뀌었으면 false (타이머 종료)
    async fn activity_tick(&self, platform: Platform, session_id: &str) -> bool {
        let _guard = self.lock(platform).await;
        match self.touch_locked(platform, Some(session_id)).await {
            Ok(touched) => touched,
            Err(e) => {
                warn!(%platform, "활동 시각 갱신 실패: {e}");
                true
            }
        }
    }

    pub(crate) async fn clear_recovery_attempts(&self, platform: Platform) {
        if let Err(e) = self
            .inner
            .store
            .remove(&keys::recovery_attempts(platform))
            .await
        {
            warn!(%platform, "복구 카운터 삭제 실패: {e}");
        }
    }

    /// 상태 갱신, 이전 값 반환
    fn set_state(&self, platform: Platform, logged_in: bool) -> bool {
        let mut states = self.inner.states.write();
        let previous = states.get(platform);
        states.set(platform, logged_in);
        previous
    }

    fn notify(&self) {
        let states = self.login_states();
        self.inner.listeners.notify(&states);
    }
}

fn new_session_id(platform: Platform) -> String {
    format!("{platform}_{}", Uuid::new_v4().simple())
}

fn login_reason(days_since_login: i64) -> String {
    match days_since_login {
        0 => "오늘 사용한 플랫폼 — 바로 다시 로그인하세요".to_string(),
        1..=2 => "최근 사용한 플랫폼 — 빠른 재로그인 권장".to_string(),
        3..=6 => format!("{days_since_login}일 전 마지막 로그인"),
        _ => "오랫동안 사용하지 않음".to_string(),
    }
}

/// 내보내기 항목의 SHA-256 체크섬 (hex)
fn export_checksum(login_data: &BTreeMap<Platform, ExportEntry>) -> Result<String, CoreError> {
    let canonical = serde_json::to_string(login_data)?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}

/// 내보낸 데이터의 체크섬 검증
pub fn verify_export(export: &LoginExport) -> bool {
    export_checksum(&export.login_data).is_ok_and(|checksum| checksum == export.checksum)
}
