//! 세션 백업 스냅샷 모델.
//!
//! 유효한 세션의 비민감 필드를 `session_backup` 키에 통째로 저장한다.
//! 스냅샷은 수정되지 않고 항상 전체 교체된다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::platform::Platform;
use crate::models::session::SessionRecord;

/// 스냅샷 포맷 버전
pub const BACKUP_FORMAT_VERSION: &str = "1.0";

/// 세션 백업 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBackupSnapshot {
    /// 스냅샷 생성 시각 (epoch 밀리초)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// 포맷 버전
    #[serde(default = "default_version")]
    pub version: String,
    /// 플랫폼별 세션 요약
    #[serde(default)]
    pub sessions: BTreeMap<Platform, BackupEntry>,
}

fn default_version() -> String {
    BACKUP_FORMAT_VERSION.to_string()
}

impl SessionBackupSnapshot {
    /// 빈 스냅샷
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            version: default_version(),
            sessions: BTreeMap::new(),
        }
    }

    /// `max_age`보다 오래된 스냅샷인지
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.timestamp > max_age
    }
}

/// 백업된 세션 요약 (비민감 필드만)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub is_logged_in: bool,
    pub login_time: DateTime<Utc>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    pub session_id: String,
}

impl From<&SessionRecord> for BackupEntry {
    fn from(record: &SessionRecord) -> Self {
        Self {
            is_logged_in: record.is_logged_in,
            login_time: record.login_time,
            last_activity: record.last_activity,
            session_id: record.session_id.clone(),
        }
    }
}

/// 플랫폼별 복원 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreResult {
    /// 백업에서 로그인 복원됨
    Restored,
    /// 이미 유효한 세션이 있어 건너뜀
    SkippedActive,
    /// 저장 실패
    Failed,
}

/// 복원 결과 (스냅샷에 있던 플랫폼만 포함)
pub type RestoreReport = BTreeMap<Platform, RestoreResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn staleness_boundary() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let snapshot = SessionBackupSnapshot::new(t0);
        let max_age = Duration::days(7);
        assert!(!snapshot.is_stale(t0 + Duration::days(6), max_age));
        assert!(!snapshot.is_stale(t0 + Duration::days(7), max_age));
        assert!(snapshot.is_stale(t0 + Duration::days(8), max_age));
    }

    #[test]
    fn snapshot_json_layout() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut snapshot = SessionBackupSnapshot::new(t0);
        snapshot.sessions.insert(
            Platform::YouTube,
            BackupEntry {
                is_logged_in: true,
                login_time: t0,
                last_activity: None,
                session_id: "abc".to_string(),
            },
        );
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["timestamp"], t0.timestamp_millis());
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["sessions"]["youtube"]["sessionId"], "abc");

        let back: SessionBackupSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
