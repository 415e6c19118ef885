//! 설정 및 DI 와이어링 통합 테스트.
//!
//! AppConfig → ConfigManager → SQLite 저장소 → SessionService.

use reelgate_core::config::AppConfig;
use reelgate_core::config_manager::ConfigManager;
use reelgate_core::error::CoreError;
use reelgate_core::models::platform::Platform;
use reelgate_core::models::session::LoginMetadata;
use reelgate_core::ports::browser::{BrowserOptions, BrowserOutcome, BrowserSurface};
use reelgate_core::ports::clock::SystemClock;
use reelgate_session::manager::verify_export;
use reelgate_session::service::SessionService;
use reelgate_storage::sqlite::SqliteKvStore;
use std::path::Path;
use std::sync::Arc;

struct NoBrowser;

#[async_trait::async_trait]
impl BrowserSurface for NoBrowser {
    async fn open(&self, _url: &str, _options: &BrowserOptions) -> Result<BrowserOutcome, CoreError> {
        Ok(BrowserOutcome::Cancelled)
    }
}

fn boot(db_path: &Path, config: AppConfig) -> SessionService {
    let store = SqliteKvStore::open(db_path).unwrap();
    SessionService::new(
        Arc::new(store),
        Arc::new(SystemClock),
        Arc::new(NoBrowser),
        config,
    )
}

#[test]
fn config_defaults_are_valid() {
    let config = AppConfig::default_config();
    config.validate().unwrap();

    for platform in Platform::ALL {
        assert!(config.session.max_age_days.get(platform) > 0);
    }
    assert!(config.session.max_inactivity_days > 0);
    assert!(config.recovery.max_attempts > 0);
    assert!(config.monitor.activity_interval() < config.monitor.health_check_interval());
    assert!(config.recovery.browser_settle() < config.recovery.browser_timeout());
}

#[test]
fn config_serde_roundtrip() {
    let config = AppConfig::default_config();
    let json = serde_json::to_string(&config).unwrap();
    let back: AppConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn config_file_drives_session_policy() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("config.json")).unwrap();
    manager
        .update_with(|c| c.session.max_age_days.tiktok = 3)
        .unwrap();

    let reloaded = ConfigManager::with_path(dir.path().join("config.json")).unwrap();
    let service = boot(&dir.path().join("reelgate.db"), reloaded.get());
    assert_eq!(
        service.manager().policy().max_session_age(Platform::TikTok),
        chrono::Duration::days(3)
    );
}

#[tokio::test]
async fn sessions_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("reelgate.db");

    let first = boot(&db_path, AppConfig::default_config());
    first
        .manager()
        .set_login_status(Platform::Instagram, true, LoginMetadata::method("realWebView"))
        .await
        .unwrap();
    first.shutdown().await.unwrap();
    drop(first);

    let second = boot(&db_path, AppConfig::default_config());
    let report = second.initialize().await;
    assert!(report.states.instagram);
    assert!(!report.states.youtube);

    let record = second
        .manager()
        .get_record(Platform::Instagram)
        .await
        .unwrap();
    assert_eq!(record.metadata.login_method, "realWebView");
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn export_from_sqlite_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let service = boot(&dir.path().join("reelgate.db"), AppConfig::default_config());
    service
        .manager()
        .set_login_status(Platform::YouTube, true, LoginMetadata::new())
        .await
        .unwrap();

    let export = service.manager().export_login_data().await.unwrap();
    assert_eq!(export.total_logins, 1);
    assert!(verify_export(&export));

    let raw = serde_json::to_string(&export).unwrap();
    assert!(!raw.contains("youtube_"), "session id must not be exported");

    let mut tampered = export.clone();
    tampered
        .login_data
        .get_mut(&Platform::YouTube)
        .unwrap()
        .login_method = "forged".to_string();
    assert!(!verify_export(&tampered));
    service.manager().cleanup();
}

#[tokio::test]
async fn diagnostics_list_managed_keys() {
    let dir = tempfile::tempdir().unwrap();
    let service = boot(&dir.path().join("reelgate.db"), AppConfig::default_config());
    service
        .manager()
        .set_login_status(Platform::TikTok, true, LoginMetadata::new())
        .await
        .unwrap();
    service.backup().create_session_backup().await.unwrap();

    let diagnostics = service.manager().diagnostics().await.unwrap();
    assert!(diagnostics.managed_keys.contains(&"login_tiktok".to_string()));
    assert!(diagnostics.managed_keys.contains(&"session_backup".to_string()));
    assert!(diagnostics.record_bytes[&Platform::TikTok] > 0);
    assert_eq!(diagnostics.active_timers, vec![Platform::TikTok]);
    service.manager().cleanup();
}
