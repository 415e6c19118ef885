//! 세션 건강/통계 리포트 모델.
//!
//! 읽기 전용 파생 값 — 세션 상태를 변경하지 않는다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::platform::Platform;

/// 전체 건강 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Healthy,
    Warning,
    Critical,
}

/// 세션 건강 리포트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHealth {
    pub overall: HealthLevel,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// 플랫폼별 로그인 통계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub platform: Platform,
    pub is_logged_in: bool,
    pub login_time: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    /// 세션 나이 (초)
    pub session_age_secs: i64,
    /// 마지막 활동 이후 경과 (초)
    pub last_activity_age_secs: Option<i64>,
    pub session_id: Option<String>,
    pub login_method: Option<String>,
    pub is_expired: bool,
    /// 만료까지 남은 시간 (초, 음수면 이미 만료)
    pub time_to_expiry_secs: i64,
}

impl PlatformStats {
    /// 세션 없는 플랫폼 통계
    pub fn absent(platform: Platform) -> Self {
        Self {
            platform,
            is_logged_in: false,
            login_time: None,
            last_activity: None,
            session_age_secs: 0,
            last_activity_age_secs: None,
            session_id: None,
            login_method: None,
            is_expired: false,
            time_to_expiry_secs: 0,
        }
    }

    pub fn session_age(&self) -> Duration {
        Duration::seconds(self.session_age_secs)
    }

    pub fn last_activity_age(&self) -> Option<Duration> {
        self.last_activity_age_secs.map(Duration::seconds)
    }

    pub fn time_to_expiry(&self) -> Duration {
        Duration::seconds(self.time_to_expiry_secs)
    }
}

/// 전체 로그인 통계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStats {
    pub platforms: BTreeMap<Platform, PlatformStats>,
    pub total_logged_in: usize,
    pub all_logged_in: bool,
    pub any_logged_in: bool,
    pub last_checked: DateTime<Utc>,
}

/// 내보내기 항목 (세션 ID 등 민감 필드 제외)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    pub platform: Platform,
    pub is_logged_in: bool,
    pub login_time: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
    pub app_version: String,
    pub login_method: String,
}

/// 로그인 데이터 내보내기
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginExport {
    pub export_date: DateTime<Utc>,
    pub export_version: String,
    pub app_version: String,
    pub login_data: BTreeMap<Platform, ExportEntry>,
    pub total_logins: usize,
    /// `login_data` JSON의 SHA-256 (hex)
    pub checksum: String,
}

/// 로그인 제안 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    Low,
    Medium,
    High,
}

/// 로그인 제안
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSuggestion {
    pub platform: Platform,
    pub priority: SuggestionPriority,
    /// 마지막 로그인 이후 일수 (기록 없으면 None)
    pub days_since_login: Option<i64>,
    pub reason: String,
}

/// 진단 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// 관리 대상 저장소 키
    pub managed_keys: Vec<String>,
    /// 플랫폼 레코드 크기 (바이트)
    pub record_bytes: BTreeMap<Platform, usize>,
    pub total_bytes: usize,
    /// 활동 타이머가 돌고 있는 플랫폼
    pub active_timers: Vec<Platform>,
    pub listener_count: usize,
}

/// 사람이 읽는 경과 시간 (`2d 3h`, `4h 10m`, `7m`, `12s`)
///
/// 음수는 0으로 취급한다.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}
