//! 세션 모델.
//!
//! 플랫폼당 하나씩 저장되는 세션 레코드와 메모리 상의 로그인 상태 맵.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::models::platform::Platform;

/// 기본 로그인 방식
pub const DEFAULT_LOGIN_METHOD: &str = "webBrowser";

/// 앱 버전 (세션 메타데이터에 기록)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 플랫폼 세션 레코드 (`login_<platform>` 키에 JSON으로 저장)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// 플랫폼 (불변 식별자)
    pub platform: Platform,
    /// 현재 신뢰 플래그
    pub is_logged_in: bool,
    /// 세션 생성 시각
    pub login_time: DateTime<Utc>,
    /// 마지막 활동 시각 (로그인 중 주기적으로 갱신)
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    /// 로그인마다 새로 발급되는 세션 ID
    pub session_id: String,
    /// 마지막 무음 연장 시각
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewed_at: Option<DateTime<Utc>>,
    /// 로그인 방식, 기기 정보 등 (유효성 판정에는 쓰이지 않음)
    #[serde(default)]
    pub metadata: SessionMetadata,
}

impl SessionRecord {
    /// 새 로그인 레코드 생성 (`login_time = last_activity = now`)
    pub fn new(
        platform: Platform,
        session_id: String,
        now: DateTime<Utc>,
        metadata: SessionMetadata,
    ) -> Self {
        Self {
            platform,
            is_logged_in: true,
            login_time: now,
            last_activity: Some(now),
            session_id,
            renewed_at: None,
            metadata,
        }
    }

    /// 세션 수명 계산 기준 시각 (연장된 적이 있으면 마지막 연장 시각)
    pub fn age_anchor(&self) -> DateTime<Utc> {
        match self.renewed_at {
            Some(renewed) if renewed > self.login_time => renewed,
            _ => self.login_time,
        }
    }

    /// 저장소 JSON 파싱
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 저장소 JSON 직렬화
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 세션 메타데이터 — 정보 제공용
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// 로그인 방식 (webBrowser, realWebView, backup_restore 등)
    pub login_method: String,
    /// 브라우저 User-Agent
    pub user_agent: String,
    /// 로그인 당시 앱 버전
    pub app_version: String,
    /// 기기 정보 (민감 정보 제외)
    #[serde(default)]
    pub device: DeviceInfo,
    /// 호출자가 넘긴 추가 필드
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            login_method: DEFAULT_LOGIN_METHOD.to_string(),
            user_agent: default_user_agent(),
            app_version: APP_VERSION.to_string(),
            device: DeviceInfo::current(),
            extra: Map::new(),
        }
    }
}

fn default_user_agent() -> String {
    format!("Reelgate/{APP_VERSION}")
}

/// 기기 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// OS 식별자
    pub platform: String,
    /// 타임존 (알 수 없으면 None)
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl DeviceInfo {
    /// 현재 실행 환경의 기기 정보
    pub fn current() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
            time_zone: std::env::var("TZ").ok().filter(|tz| !tz.is_empty()),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            platform: "unknown".to_string(),
            time_zone: None,
        }
    }
}

/// 로그인 요청 메타데이터 (호출자 입력)
///
/// 비어 있는 필드는 기본값으로 채워진다.
#[derive(Debug, Clone, Default)]
pub struct LoginMetadata {
    login_method: Option<String>,
    user_agent: Option<String>,
    extra: Map<String, Value>,
}

impl LoginMetadata {
    /// 빈 메타데이터
    pub fn new() -> Self {
        Self::default()
    }

    /// 로그인 방식 지정
    pub fn method(login_method: impl Into<String>) -> Self {
        Self {
            login_method: Some(login_method.into()),
            ..Self::default()
        }
    }

    /// User-Agent 지정
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// 추가 필드
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// 지정된 로그인 방식
    pub fn login_method(&self) -> Option<&str> {
        self.login_method.as_deref()
    }

    /// 저장용 메타데이터로 변환
    pub fn into_session_metadata(self) -> SessionMetadata {
        let mut metadata = SessionMetadata {
            device: DeviceInfo::current(),
            ..SessionMetadata::default()
        };
        if let Some(method) = self.login_method {
            metadata.login_method = method;
        }
        if let Some(user_agent) = self.user_agent {
            metadata.user_agent = user_agent;
        }
        metadata.extra = self.extra;
        metadata
    }
}

/// 플랫폼별 로그인 상태 맵 (구독자에게 전달되는 값)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginStates {
    pub youtube: bool,
    pub tiktok: bool,
    pub instagram: bool,
}

impl LoginStates {
    /// 플랫폼 상태 조회
    pub fn get(&self, platform: Platform) -> bool {
        match platform {
            Platform::YouTube => self.youtube,
            Platform::TikTok => self.tiktok,
            Platform::Instagram => self.instagram,
        }
    }

    /// 플랫폼 상태 설정
    pub fn set(&mut self, platform: Platform, logged_in: bool) {
        match platform {
            Platform::YouTube => self.youtube = logged_in,
            Platform::TikTok => self.tiktok = logged_in,
            Platform::Instagram => self.instagram = logged_in,
        }
    }

    /// (플랫폼, 상태) 순회
    pub fn iter(&self) -> impl Iterator<Item = (Platform, bool)> + '_ {
        Platform::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    /// 로그인된 플랫폼 수
    pub fn logged_in_count(&self) -> usize {
        self.iter().filter(|(_, logged_in)| *logged_in).count()
    }

    /// 모든 플랫폼 로그인 여부
    pub fn all_logged_in(&self) -> bool {
        self.logged_in_count() == Platform::ALL.len()
    }

    /// 하나 이상 로그인 여부
    pub fn any_logged_in(&self) -> bool {
        self.logged_in_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn record_json_uses_camel_case() {
        let record = SessionRecord::new(
            Platform::Instagram,
            "sid-1".to_string(),
            t0(),
            LoginMetadata::method("browser").into_session_metadata(),
        );
        let json = record.to_json().unwrap();
        assert!(json.contains(r#""isLoggedIn":true"#));
        assert!(json.contains(r#""loginTime""#));
        assert!(json.contains(r#""lastActivity""#));
        assert!(json.contains(r#""sessionId":"sid-1""#));
        assert!(json.contains(r#""loginMethod":"browser""#));
        assert!(!json.contains("renewedAt"));
    }

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let raw = r#"{"platform":"tiktok","isLoggedIn":true,"loginTime":"2026-03-01T12:00:00Z","sessionId":"x"}"#;
        let record = SessionRecord::from_json(raw).unwrap();
        assert_eq!(record.platform, Platform::TikTok);
        assert!(record.last_activity.is_none());
        assert_eq!(record.metadata.login_method, DEFAULT_LOGIN_METHOD);
    }

    #[test]
    fn record_missing_required_field_fails() {
        let raw = r#"{"platform":"tiktok","isLoggedIn":true,"sessionId":"x"}"#;
        assert!(SessionRecord::from_json(raw).is_err());
    }

    #[test]
    fn age_anchor_prefers_renewal() {
        let mut record = SessionRecord::new(
            Platform::YouTube,
            "sid".to_string(),
            t0(),
            SessionMetadata::default(),
        );
        assert_eq!(record.age_anchor(), t0());

        record.renewed_at = Some(t0() + Duration::days(3));
        assert_eq!(record.age_anchor(), t0() + Duration::days(3));

        record.renewed_at = Some(t0() - Duration::days(1));
        assert_eq!(record.age_anchor(), t0());
    }

    #[test]
    fn metadata_extra_fields_flatten() {
        let metadata = LoginMetadata::method("backup_restore")
            .with("originalLoginTime", "2026-02-20T00:00:00Z")
            .into_session_metadata();
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["loginMethod"], "backup_restore");
        assert_eq!(value["originalLoginTime"], "2026-02-20T00:00:00Z");
    }

    #[test]
    fn login_state_counts() {
        let mut states = LoginStates::default();
        assert!(!states.any_logged_in());
        states.set(Platform::YouTube, true);
        states.set(Platform::Instagram, true);
        assert_eq!(states.logged_in_count(), 2);
        assert!(!states.all_logged_in());
        states.set(Platform::TikTok, true);
        assert!(states.all_logged_in());
    }
}
