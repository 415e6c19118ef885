//! 세션 복구 모델.
//!
//! 복구 시도 카운터와 복구 결과(상태 + 후속 조치).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::platform::Platform;

/// 플랫폼별 복구 시도 카운터 (`recovery_attempts_<platform>` 키)
///
/// 윈도우 시작 후 `window`가 지나면 0으로 간주한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryAttemptCounter {
    /// 현재 윈도우 내 시도 횟수
    pub attempts: u32,
    /// 윈도우 시작 시각 (epoch 밀리초)
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub window_start: DateTime<Utc>,
}

impl RecoveryAttemptCounter {
    /// 빈 카운터
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            attempts: 0,
            window_start: now,
        }
    }

    /// 윈도우 만료 여부
    pub fn is_window_expired(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.window_start > window
    }

    /// 만료를 반영한 유효 시도 횟수
    pub fn effective_attempts(&self, now: DateTime<Utc>, window: Duration) -> u32 {
        if self.is_window_expired(now, window) {
            0
        } else {
            self.attempts
        }
    }

    /// 시도 1회 추가 (만료된 윈도우는 새로 시작)
    pub fn incremented(self, now: DateTime<Utc>, window: Duration) -> Self {
        if self.is_window_expired(now, window) {
            Self {
                attempts: 1,
                window_start: now,
            }
        } else {
            Self {
                attempts: self.attempts.saturating_add(1),
                window_start: self.window_start,
            }
        }
    }
}

/// 복구 결과 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// 세션 없음
    NoSession,
    /// 이미 유효
    Valid,
    /// 무음 연장으로 복구
    RecoveredSilent,
    /// 브라우저 쿠키 확인으로 복구
    RecoveredCookie,
    /// 모든 경로 실패
    RecoveryFailed,
    /// 윈도우 내 시도 한도 도달
    MaxAttemptsReached,
    /// 예상치 못한 에러
    Error,
}

impl RecoveryStatus {
    /// 복구 성공 여부
    pub fn is_recovered(self) -> bool {
        matches!(
            self,
            RecoveryStatus::RecoveredSilent | RecoveryStatus::RecoveredCookie
        )
    }
}

/// 복구 후속 조치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    None,
    SessionRenewed,
    ManualLoginRequired,
}

/// 단일 플랫폼 복구 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryOutcome {
    pub status: RecoveryStatus,
    pub action: RecoveryAction,
    /// 윈도우 내 누적 시도 횟수 (실패/한도 도달 시)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl RecoveryOutcome {
    pub fn no_session() -> Self {
        Self::new(RecoveryStatus::NoSession, RecoveryAction::None)
    }

    pub fn valid() -> Self {
        Self::new(RecoveryStatus::Valid, RecoveryAction::None)
    }

    pub fn recovered_silent() -> Self {
        Self::new(RecoveryStatus::RecoveredSilent, RecoveryAction::SessionRenewed)
    }

    pub fn recovered_cookie() -> Self {
        Self::new(RecoveryStatus::RecoveredCookie, RecoveryAction::SessionRenewed)
    }

    pub fn failed(attempts: u32) -> Self {
        Self {
            attempts: Some(attempts),
            ..Self::new(RecoveryStatus::RecoveryFailed, RecoveryAction::ManualLoginRequired)
        }
    }

    pub fn max_attempts_reached(attempts: u32) -> Self {
        Self {
            attempts: Some(attempts),
            ..Self::new(
                RecoveryStatus::MaxAttemptsReached,
                RecoveryAction::ManualLoginRequired,
            )
        }
    }

    pub fn error() -> Self {
        Self::new(RecoveryStatus::Error, RecoveryAction::ManualLoginRequired)
    }

    fn new(status: RecoveryStatus, action: RecoveryAction) -> Self {
        Self {
            status,
            action,
            attempts: None,
        }
    }
}

/// 전체 플랫폼 자동 복구 결과
pub type RecoveryReport = BTreeMap<Platform, RecoveryOutcome>;

/// 백그라운드 건강 검사 항목
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum HealthCheckEntry {
    /// 로그인 상태 아님 (검사 대상 외)
    NotLoggedIn,
    /// 유효
    Healthy,
    /// 무효 → 복구 시도 결과
    Recovery(RecoveryOutcome),
}

/// 백그라운드 건강 검사 결과
pub type HealthCheckReport = BTreeMap<Platform, HealthCheckEntry>;
