//! 세션 유효성 검증.
//!
//! 저장된 세션 레코드가 지금 사용 가능한지 판정하는 순수 로직.
//! 상태를 변경하지 않으며, 무효 판정 후 처리는 호출자가 결정한다.

use chrono::{DateTime, Duration, Utc};
use reelgate_core::config::SessionConfig;
use reelgate_core::models::platform::Platform;
use reelgate_core::models::session::SessionRecord;
use serde::Serialize;

/// 검증 정책 (기간 상수)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    max_age: [Duration; 3],
    /// 마지막 활동 이후 허용 비활성 기간
    pub max_inactivity: Duration,
    /// 무결성 상한 — 이보다 오래된 로그인은 구조적으로 무효
    pub integrity_max_age: Duration,
}

impl SessionPolicy {
    /// 설정에서 정책 생성
    pub fn from_config(config: &SessionConfig) -> Self {
        let days = |d: u32| Duration::days(i64::from(d));
        Self {
            max_age: Platform::ALL.map(|p| days(config.max_age_days.get(p))),
            max_inactivity: days(config.max_inactivity_days),
            integrity_max_age: days(config.integrity_max_age_days),
        }
    }

    /// 플랫폼별 최대 세션 수명
    pub fn max_session_age(&self, platform: Platform) -> Duration {
        self.max_age[platform.index()]
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

/// 무효 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// 저장된 레코드 없음
    Missing,
    /// 레코드를 해석할 수 없음
    Malformed,
    /// 다른 플랫폼 키에 저장된 레코드
    PlatformMismatch,
    /// 로그인 시각이 미래
    FutureLogin,
    /// 로그인 시각이 무결성 상한보다 오래됨
    IntegrityExpired,
    /// `is_logged_in == false`
    NotLoggedIn,
    /// 최대 세션 수명 초과
    Expired,
    /// 비활성 기간 초과
    Inactive,
}

impl InvalidReason {
    /// 구조적 무결성 위반 여부 (복구 불가)
    pub fn is_integrity_violation(self) -> bool {
        matches!(
            self,
            InvalidReason::Malformed
                | InvalidReason::PlatformMismatch
                | InvalidReason::FutureLogin
                | InvalidReason::IntegrityExpired
        )
    }

    /// 스토어에 정리할 레코드가 남아 있는지
    pub fn has_stored_record(self) -> bool {
        !matches!(self, InvalidReason::Missing)
    }
}

/// 검증 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    Invalid(InvalidReason),
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// 무효 사유 (유효하면 None)
    pub fn reason(self) -> Option<InvalidReason> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(reason) => Some(reason),
        }
    }
}

/// 레코드 검증
///
/// 검사 순서: 무결성 → 로그인 플래그 → 수명 → 비활성.
/// 경계값은 포함(`<=`)이 유효다.
pub fn validate(record: &SessionRecord, now: DateTime<Utc>, policy: &SessionPolicy) -> Verdict {
    if record.login_time > now {
        return Verdict::Invalid(InvalidReason::FutureLogin);
    }
    if now - record.login_time > policy.integrity_max_age {
        return Verdict::Invalid(InvalidReason::IntegrityExpired);
    }

    if !record.is_logged_in {
        return Verdict::Invalid(InvalidReason::NotLoggedIn);
    }

    if now - record.age_anchor() > policy.max_session_age(record.platform) {
        return Verdict::Invalid(InvalidReason::Expired);
    }

    if let Some(last_activity) = record.last_activity {
        if now - last_activity > policy.max_inactivity {
            return Verdict::Invalid(InvalidReason::Inactive);
        }
    }

    Verdict::Valid
}

/// 유효 여부만 반환
pub fn is_valid(record: &SessionRecord, now: DateTime<Utc>, policy: &SessionPolicy) -> bool {
    validate(record, now, policy).is_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reelgate_core::models::session::SessionMetadata;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn record(platform: Platform, login_time: DateTime<Utc>) -> SessionRecord {
        let mut record = SessionRecord::new(
            platform,
            "sid".to_string(),
            login_time,
            SessionMetadata::default(),
        );
        record.last_activity = Some(now() - Duration::minutes(5));
        record
    }

    #[test]
    fn fresh_session_is_valid() {
        let policy = SessionPolicy::default();
        let r = record(Platform::YouTube, now());
        assert_eq!(validate(&r, now(), &policy), Verdict::Valid);
    }

    #[test]
    fn tiktok_expiry_boundary() {
        let policy = SessionPolicy::default();
        let seven_days = Duration::days(7);

        let expired = record(Platform::TikTok, now() - seven_days - Duration::seconds(1));
        assert_eq!(
            validate(&expired, now(), &policy),
            Verdict::Invalid(InvalidReason::Expired)
        );

        let alive = record(Platform::TikTok, now() - seven_days + Duration::seconds(1));
        assert!(is_valid(&alive, now(), &policy));

        let exact = record(Platform::TikTok, now() - seven_days);
        assert!(is_valid(&exact, now(), &policy));
    }

    #[test]
    fn platform_specific_max_age() {
        let policy = SessionPolicy::default();
        assert_eq!(policy.max_session_age(Platform::YouTube), Duration::days(30));
        assert_eq!(policy.max_session_age(Platform::TikTok), Duration::days(7));
        assert_eq!(policy.max_session_age(Platform::Instagram), Duration::days(14));

        let twenty_days = record(Platform::YouTube, now() - Duration::days(20));
        assert!(is_valid(&twenty_days, now(), &policy));
        let twenty_days = record(Platform::Instagram, now() - Duration::days(20));
        assert!(!is_valid(&twenty_days, now(), &policy));
    }

    #[test]
    fn inactivity_check() {
        let policy = SessionPolicy::default();
        let mut r = record(Platform::YouTube, now() - Duration::days(10));

        r.last_activity = Some(now() - Duration::days(7));
        assert!(is_valid(&r, now(), &policy));

        r.last_activity = Some(now() - Duration::days(7) - Duration::seconds(1));
        assert_eq!(
            validate(&r, now(), &policy),
            Verdict::Invalid(InvalidReason::Inactive)
        );

        // 활동 기록이 없으면 비활성 검사 생략
        r.last_activity = None;
        assert!(is_valid(&r, now(), &policy));
    }

    #[test]
    fn logged_out_record_is_invalid() {
        let policy = SessionPolicy::default();
        let mut r = record(Platform::YouTube, now());
        r.is_logged_in = false;
        assert_eq!(
            validate(&r, now(), &policy),
            Verdict::Invalid(InvalidReason::NotLoggedIn)
        );
    }

    #[test]
    fn integrity_violations() {
        let policy = SessionPolicy::default();

        let future = record(Platform::YouTube, now() + Duration::seconds(1));
        let verdict = validate(&future, now(), &policy);
        assert_eq!(verdict, Verdict::Invalid(InvalidReason::FutureLogin));
        assert!(verdict.reason().unwrap().is_integrity_violation());

        let ancient = record(Platform::YouTube, now() - Duration::days(366));
        assert_eq!(
            validate(&ancient, now(), &policy),
            Verdict::Invalid(InvalidReason::IntegrityExpired)
        );
    }

    #[test]
    fn renewal_extends_age_window() {
        let policy = SessionPolicy::default();
        let mut r = record(Platform::Instagram, now() - Duration::days(15));
        assert!(!is_valid(&r, now(), &policy));

        r.renewed_at = Some(now() - Duration::days(1));
        assert!(is_valid(&r, now(), &policy));
    }

    #[test]
    fn validation_is_pure() {
        let policy = SessionPolicy::default();
        let r = record(Platform::TikTok, now() - Duration::days(9));
        let before = r.clone();
        let _ = validate(&r, now(), &policy);
        assert_eq!(r, before);
    }
}
