//! 세션 자동 복구.
//!
//! 무효 세션을 제한된 횟수 안에서 복구한다.
//! 1. 조용한 갱신 — 수명 + 유예 기간 안이면 `renew_session`
//! 2. 쿠키 확인 — 외부 브라우저로 플랫폼 페이지를 열고, 취소되지 않으면 `renew_session`
//!
//! 플랫폼별 시도 횟수는 `recovery_attempts_<platform>` 키에 24시간 윈도우로 기록한다.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use reelgate_core::config::RecoveryConfig;
use reelgate_core::error::CoreError;
use reelgate_core::keys;
use reelgate_core::models::platform::Platform;
use reelgate_core::models::recovery::{
    HealthCheckEntry, HealthCheckReport, RecoveryAttemptCounter, RecoveryOutcome, RecoveryReport,
    RecoveryStatus,
};
use reelgate_core::models::session::SessionRecord;
use reelgate_core::ports::browser::{BrowserOptions, BrowserSurface};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::manager::SessionManager;

/// 복구 엔진 — 복제 시 진행 중 플래그와 잠금을 공유한다
#[derive(Clone)]
pub struct RecoveryEngine {
    manager: SessionManager,
    browser: Arc<dyn BrowserSurface>,
    config: RecoveryConfig,
    in_flight: Arc<AtomicBool>,
    locks: Arc<[Mutex<()>; 3]>,
}

/// 진행 중 플래그 해제 (패닉 시에도)
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RecoveryEngine {
    pub fn new(
        manager: SessionManager,
        browser: Arc<dyn BrowserSurface>,
        config: &RecoveryConfig,
    ) -> Self {
        Self {
            manager,
            browser,
            config: config.clone(),
            in_flight: Arc::new(AtomicBool::new(false)),
            locks: Arc::new([Mutex::new(()), Mutex::new(()), Mutex::new(())]),
        }
    }

    /// 자동 복구 진행 중 여부
    pub fn is_recovering(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// 플랫폼 하나 복구
    ///
    /// 유효한 세션은 건드리지 않는다. 호출 한 번에 카운터는 최대 1 증가한다.
    pub async fn recover_platform_session(&self, platform: Platform) -> RecoveryOutcome {
        let _guard = self.locks[platform.index()].lock().await;

        let check = self.manager.inspect(platform).await;
        let record = match check.record {
            Some(record) if record.is_logged_in => record,
            _ => {
                debug!(%platform, "복구할 세션 없음");
                return RecoveryOutcome::no_session();
            }
        };

        let Some(reason) = check.verdict.reason() else {
            return RecoveryOutcome::valid();
        };

        let now = self.manager.clock().now();
        let window = self.attempt_window();
        let counter = match self.read_counter(platform, now).await {
            Ok(counter) => counter,
            Err(e) => {
                error!(%platform, "복구 카운터 읽기 실패: {e}");
                return RecoveryOutcome::error();
            }
        };
        let attempts = counter.effective_attempts(now, window);

        if reason.is_integrity_violation() {
            warn!(%platform, ?reason, "무결성 위반 세션 — 복구 불가");
            return RecoveryOutcome::failed(attempts);
        }

        if attempts >= self.config.max_attempts {
            warn!(%platform, attempts, "복구 시도 한도 도달 — 수동 로그인 필요");
            return RecoveryOutcome::max_attempts_reached(attempts);
        }

        let counter = counter.incremented(now, window);
        if let Err(e) = self.write_counter(platform, &counter).await {
            error!(%platform, "복구 카운터 저장 실패: {e}");
            return RecoveryOutcome::error();
        }
        info!(%platform, ?reason, attempt = counter.attempts, "세션 복구 시도");

        if self.try_silent_recovery(platform, &record, now).await {
            self.manager.clear_recovery_attempts(platform).await;
            info!(%platform, status = "recovered_silent", "세션 복구 성공");
            return RecoveryOutcome::recovered_silent();
        }

        if self.try_cookie_recovery(platform).await {
            self.manager.clear_recovery_attempts(platform).await;
            info!(%platform, status = "recovered_cookie", "세션 복구 성공");
            return RecoveryOutcome::recovered_cookie();
        }

        warn!(%platform, attempts = counter.attempts, "세션 복구 실패 — 수동 로그인 필요");
        RecoveryOutcome::failed(counter.attempts)
    }

    /// 전체 플랫폼 자동 복구
    ///
    /// 이미 진행 중이면 즉시 `None`.
    pub async fn attempt_auto_recovery(&self) -> Option<RecoveryReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("자동 복구 이미 진행 중 — 건너뜀");
            return None;
        }
        let _reset = InFlightGuard(&self.in_flight);

        info!("자동 복구 시작");
        let report: RecoveryReport = join_all(
            Platform::ALL.map(|p| async move { (p, self.recover_platform_session(p).await) }),
        )
        .await
        .into_iter()
        .collect();

        info!(?report, "자동 복구 완료");
        Some(report)
    }

    /// 로그인된 플랫폼만 대상으로 하는 건강 검사
    ///
    /// 유효하지도 복구되지도 않은 플랫폼은 관리자에서 로그아웃 상태로 내린다.
    pub async fn perform_health_check(&self) -> HealthCheckReport {
        let states = self.manager.login_states();

        let report: HealthCheckReport = join_all(Platform::ALL.map(|p| async move {
            if !states.get(p) {
                return (p, HealthCheckEntry::NotLoggedIn);
            }
            let outcome = self.recover_platform_session(p).await;
            if outcome.status == RecoveryStatus::Valid {
                return (p, HealthCheckEntry::Healthy);
            }
            if !outcome.status.is_recovered() {
                self.manager.mark_unrecoverable(p).await;
            }
            let entry = HealthCheckEntry::Recovery(outcome);
            (p, entry)
        }))
        .await
        .into_iter()
        .collect();

        debug!(?report, "건강 검사 완료");
        report
    }

    /// 현재 윈도우 기준 시도 횟수
    pub async fn attempts(&self, platform: Platform) -> Result<u32, CoreError> {
        let now = self.manager.clock().now();
        let counter = self.read_counter(platform, now).await?;
        Ok(counter.effective_attempts(now, self.attempt_window()))
    }

    async fn try_silent_recovery(
        &self,
        platform: Platform,
        record: &SessionRecord,
        now: DateTime<Utc>,
    ) -> bool {
        let age = now - record.age_anchor();
        let limit = self.manager.policy().max_session_age(platform)
            + Duration::hours(i64::from(self.config.silent_grace_hours));
        if age > limit {
            debug!(%platform, age_hours = age.num_hours(), "유예 기간 초과 — 조용한 갱신 불가");
            return false;
        }

        match self.manager.renew_session(platform).await {
            Ok(renewed) => renewed,
            Err(e) => {
                warn!(%platform, "조용한 갱신 실패: {e}");
                false
            }
        }
    }

    async fn try_cookie_recovery(&self, platform: Platform) -> bool {
        let url = platform.verify_url();
        let options = BrowserOptions::default();
        debug!(%platform, url, "쿠키 확인용 브라우저 열기");

        let opened =
            tokio::time::timeout(self.config.browser_timeout(), self.browser.open(url, &options))
                .await;

        let outcome = match opened {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(%platform, "브라우저 열기 실패: {e}");
                return false;
            }
            Err(_) => {
                warn!(
                    %platform,
                    timeout_ms = self.config.browser_timeout_ms,
                    "브라우저 응답 타임아웃"
                );
                return false;
            }
        };

        tokio::time::sleep(self.config.browser_settle()).await;

        if !outcome.is_positive() {
            info!(%platform, ?outcome, "쿠키 확인 취소됨");
            return false;
        }

        match self.manager.renew_session(platform).await {
            Ok(renewed) => renewed,
            Err(e) => {
                warn!(%platform, "쿠키 확인 후 갱신 실패: {e}");
                false
            }
        }
    }

    fn attempt_window(&self) -> Duration {
        Duration::hours(i64::from(self.config.attempt_window_hours))
    }

    async fn read_counter(
        &self,
        platform: Platform,
        now: DateTime<Utc>,
    ) -> Result<RecoveryAttemptCounter, CoreError> {
        let raw = self
            .manager
            .store()
            .get(&keys::recovery_attempts(platform))
            .await?;

        Ok(match raw {
            None => RecoveryAttemptCounter::fresh(now),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(%platform, "복구 카운터 해석 실패 — 초기화: {e}");
                RecoveryAttemptCounter::fresh(now)
            }),
        })
    }

    async fn write_counter(
        &self,
        platform: Platform,
        counter: &RecoveryAttemptCounter,
    ) -> Result<(), CoreError> {
        let raw = serde_json::to_string(counter)?;
        self.manager
            .store()
            .set(&keys::recovery_attempts(platform), &raw)
            .await
    }
}
