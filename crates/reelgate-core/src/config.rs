//! 애플리케이션 설정 구조체.
//!
//! 세션 정책, 복구, 백업, 모니터링 주기, 저장소 경로 등 런타임 설정을 정의한다.
//! `config` crate를 통해 파일/환경변수에서 로드 (`config_manager` 참조).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::platform::Platform;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 세션 유효성 정책
    #[serde(default)]
    pub session: SessionConfig,
    /// 자동 복구 설정
    #[serde(default)]
    pub recovery: RecoveryConfig,
    /// 백업/복원 설정
    #[serde(default)]
    pub backup: BackupConfig,
    /// 백그라운드 모니터링 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 로컬 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

// ============================================================
// 세션 정책
// ============================================================

/// 플랫폼별 일수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDays {
    pub youtube: u32,
    pub tiktok: u32,
    pub instagram: u32,
}

impl PlatformDays {
    pub fn get(&self, platform: Platform) -> u32 {
        match platform {
            Platform::YouTube => self.youtube,
            Platform::TikTok => self.tiktok,
            Platform::Instagram => self.instagram,
        }
    }
}

impl Default for PlatformDays {
    fn default() -> Self {
        // 각 플랫폼의 실제 세션 수명 근사치
        Self {
            youtube: 30,
            tiktok: 7,
            instagram: 14,
        }
    }
}

/// 세션 유효성 정책 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 플랫폼별 최대 세션 나이 (일)
    #[serde(default)]
    pub max_age_days: PlatformDays,
    /// 최대 비활동 기간 (일)
    #[serde(default = "default_max_inactivity_days")]
    pub max_inactivity_days: u32,
    /// 무결성 한계 — 이보다 오래된 login_time은 변조/손상으로 간주 (일)
    #[serde(default = "default_integrity_max_age_days")]
    pub integrity_max_age_days: u32,
    /// 만료 임박 경고 기준 (일)
    #[serde(default = "default_expiry_warning_days")]
    pub expiry_warning_days: u32,
    /// 비활동 경고 기준 (시간)
    #[serde(default = "default_inactivity_warning_hours")]
    pub inactivity_warning_hours: u32,
    /// 이 개수를 초과하는 이슈가 동시에 있으면 critical
    #[serde(default = "default_critical_issue_threshold")]
    pub critical_issue_threshold: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_days: PlatformDays::default(),
            max_inactivity_days: default_max_inactivity_days(),
            integrity_max_age_days: default_integrity_max_age_days(),
            expiry_warning_days: default_expiry_warning_days(),
            inactivity_warning_hours: default_inactivity_warning_hours(),
            critical_issue_threshold: default_critical_issue_threshold(),
        }
    }
}

fn default_max_inactivity_days() -> u32 {
    7
}

fn default_integrity_max_age_days() -> u32 {
    365
}

fn default_expiry_warning_days() -> u32 {
    3
}

fn default_inactivity_warning_hours() -> u32 {
    24
}

fn default_critical_issue_threshold() -> usize {
    2
}

// ============================================================
// 복구 설정
// ============================================================

/// 자동 복구 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// 윈도우 내 최대 자동 복구 시도 횟수
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 시도 카운터 윈도우 (시간)
    #[serde(default = "default_attempt_window_hours")]
    pub attempt_window_hours: u32,
    /// 무음 복구 허용 초과 시간 (시간) — 최대 나이 + 이 값 이내만 연장
    #[serde(default = "default_silent_grace_hours")]
    pub silent_grace_hours: u32,
    /// 브라우저 복귀 후 대기 시간 (밀리초)
    #[serde(default = "default_browser_settle_ms")]
    pub browser_settle_ms: u64,
    /// 브라우저 표면 하드 타임아웃 (밀리초)
    #[serde(default = "default_browser_timeout_ms")]
    pub browser_timeout_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_window_hours: default_attempt_window_hours(),
            silent_grace_hours: default_silent_grace_hours(),
            browser_settle_ms: default_browser_settle_ms(),
            browser_timeout_ms: default_browser_timeout_ms(),
        }
    }
}

impl RecoveryConfig {
    pub fn browser_settle(&self) -> Duration {
        Duration::from_millis(self.browser_settle_ms)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_millis(self.browser_timeout_ms)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_attempt_window_hours() -> u32 {
    24
}

fn default_silent_grace_hours() -> u32 {
    24
}

fn default_browser_settle_ms() -> u64 {
    2_000
}

fn default_browser_timeout_ms() -> u64 {
    30_000
}

// ============================================================
// 백업 설정
// ============================================================

/// 백업/복원 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// 이보다 오래된 스냅샷은 무시 (일)
    #[serde(default = "default_backup_max_age_days")]
    pub max_age_days: u32,
    /// 시작 시 백업 복원 시도
    #[serde(default = "default_true")]
    pub restore_on_launch: bool,
    /// 백그라운드 전환 시 스냅샷 생성
    #[serde(default = "default_true")]
    pub backup_on_background: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_backup_max_age_days(),
            restore_on_launch: true,
            backup_on_background: true,
        }
    }
}

fn default_backup_max_age_days() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

// ============================================================
// 모니터링 설정
// ============================================================

/// 백그라운드 모니터링 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 로그인 중 활동 갱신 주기 (초)
    #[serde(default = "default_activity_interval_secs")]
    pub activity_interval_secs: u64,
    /// 세션 재검증/복구 주기 (초)
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            activity_interval_secs: default_activity_interval_secs(),
            health_check_interval_secs: default_health_check_interval_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn activity_interval(&self) -> Duration {
        Duration::from_secs(self.activity_interval_secs)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }
}

fn default_activity_interval_secs() -> u64 {
    300 // 5분
}

fn default_health_check_interval_secs() -> u64 {
    1_800 // 30분
}

// ============================================================
// 저장소 설정
// ============================================================

/// 로컬 저장소 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite 파일 경로 (None이면 플랫폼 기본 데이터 디렉토리)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            session: SessionConfig::default(),
            recovery: RecoveryConfig::default(),
            backup: BackupConfig::default(),
            monitor: MonitorConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    /// 설정값 검증 — 모든 기간은 양수여야 한다
    pub fn validate(&self) -> Result<(), CoreError> {
        for platform in Platform::ALL {
            if self.session.max_age_days.get(platform) == 0 {
                return Err(invalid(
                    &format!("session.max_age_days.{platform}"),
                    "0보다 커야 합니다",
                ));
            }
        }

        let positive = [
            ("session.max_inactivity_days", self.session.max_inactivity_days as u64),
            ("session.integrity_max_age_days", self.session.integrity_max_age_days as u64),
            ("recovery.attempt_window_hours", self.recovery.attempt_window_hours as u64),
            ("recovery.browser_timeout_ms", self.recovery.browser_timeout_ms),
            ("backup.max_age_days", self.backup.max_age_days as u64),
            ("monitor.activity_interval_secs", self.monitor.activity_interval_secs),
            (
                "monitor.health_check_interval_secs",
                self.monitor.health_check_interval_secs,
            ),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(invalid(field, "0보다 커야 합니다"));
        }

        let longest = Platform::ALL
            .iter()
            .map(|p| self.session.max_age_days.get(*p))
            .max()
            .unwrap_or_default();
        if self.session.integrity_max_age_days < longest {
            return Err(invalid(
                "session.integrity_max_age_days",
                "최대 세션 나이보다 짧을 수 없습니다",
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

fn invalid(field: &str, message: &str) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default_config().validate().is_ok());
    }

    #[test]
    fn zero_max_age_rejected() {
        let mut config = AppConfig::default_config();
        config.session.max_age_days.tiktok = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "session.max_age_days.tiktok"));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = AppConfig::default_config();
        config.monitor.health_check_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn integrity_horizon_must_cover_max_age() {
        let mut config = AppConfig::default_config();
        config.session.integrity_max_age_days = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"recovery":{"max_attempts":5}}"#).unwrap();
        assert_eq!(config.recovery.max_attempts, 5);
        assert_eq!(config.recovery.attempt_window_hours, 24);
        assert_eq!(config.session.max_age_days.instagram, 14);
        assert!(config.backup.restore_on_launch);
    }
}
