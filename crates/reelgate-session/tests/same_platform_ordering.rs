//! 같은 플랫폼에 대한 동시 작업의 직렬화 통합 테스트.
//!
//! 복원/건강 검사가 스토어나 브라우저에서 대기하는 사이에
//! 사용자 로그인이 끼어드는 순서를 재현한다.

mod common;

use chrono::Duration;
use common::{start_time, Device, GatedBrowser, GatedStore, RecordingBrowser};
use parking_lot::Mutex;
use reelgate_core::config::AppConfig;
use reelgate_core::keys;
use reelgate_core::models::backup::RestoreResult;
use reelgate_core::models::platform::Platform;
use reelgate_core::models::recovery::{HealthCheckEntry, RecoveryStatus};
use reelgate_core::models::session::LoginMetadata;
use reelgate_core::ports::browser::BrowserOutcome;
use reelgate_core::ports::clock::ManualClock;
use reelgate_session::service::SessionService;
use reelgate_storage::memory::MemoryStore;
use std::sync::Arc;

const USER_LOGIN: &str = "userLogin";

#[tokio::test]
async fn restore_does_not_overwrite_login_that_lands_mid_restore() {
    let store = GatedStore::new();
    let svc = SessionService::new(
        store.clone(),
        Arc::new(ManualClock::new(start_time())),
        RecordingBrowser::new(BrowserOutcome::Cancelled),
        AppConfig::default_config(),
    );

    // 이전 세션의 백업을 남기고 로그아웃
    svc.manager()
        .set_login_status(Platform::YouTube, true, LoginMetadata::new())
        .await
        .unwrap();
    svc.backup().create_session_backup().await.unwrap();
    svc.manager().logout(Platform::YouTube).await.unwrap();

    // 복원의 유효성 확인 읽기에서 멈춤
    store.arm(keys::login(Platform::YouTube));
    let backup = svc.backup().clone();
    let restore = tokio::spawn(async move { backup.restore_session_backup().await });
    store.wait_paused().await;

    let manager = svc.manager().clone();
    let login = tokio::spawn(async move {
        manager
            .set_login_status(Platform::YouTube, true, LoginMetadata::method(USER_LOGIN))
            .await
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    // 복원이 플랫폼 잠금을 쥐고 있는 동안 로그인은 대기한다
    assert!(!login.is_finished());

    store.release();
    let report = restore.await.unwrap().unwrap().unwrap();
    assert_eq!(report[&Platform::YouTube], RestoreResult::Restored);
    login.await.unwrap().unwrap();

    let record = svc.manager().get_record(Platform::YouTube).await.unwrap();
    assert_eq!(record.metadata.login_method, USER_LOGIN);
    assert!(svc.manager().is_logged_in(Platform::YouTube));
    svc.manager().cleanup();
}

#[tokio::test]
async fn failed_health_check_keeps_login_that_lands_mid_recovery() {
    let browser = GatedBrowser::new(BrowserOutcome::Cancelled);
    let clock = Arc::new(ManualClock::new(start_time()));
    let mut config = AppConfig::default_config();
    config.recovery.browser_settle_ms = 0;
    let svc = SessionService::new(
        Arc::new(MemoryStore::new()),
        clock.clone(),
        browser.clone(),
        config,
    );

    svc.manager()
        .set_login_status(Platform::TikTok, true, LoginMetadata::new())
        .await
        .unwrap();
    clock.advance(Duration::days(10));

    // 쿠키 확인 브라우저가 열려 있는 사이에 사용자가 다시 로그인
    let recovery = svc.recovery().clone();
    let check = tokio::spawn(async move { recovery.perform_health_check().await });
    browser.wait_opened().await;
    svc.manager()
        .set_login_status(Platform::TikTok, true, LoginMetadata::method(USER_LOGIN))
        .await
        .unwrap();
    browser.release();

    let report = check.await.unwrap();
    match &report[&Platform::TikTok] {
        HealthCheckEntry::Recovery(outcome) => {
            assert_eq!(outcome.status, RecoveryStatus::RecoveryFailed)
        }
        other => panic!("unexpected entry: {other:?}"),
    }

    // 실패한 복구가 새 로그인을 내리지 않는다
    assert!(svc.manager().is_logged_in(Platform::TikTok));
    assert_eq!(svc.manager().active_timers(), vec![Platform::TikTok]);
    let record = svc.manager().get_record(Platform::TikTok).await.unwrap();
    assert_eq!(record.metadata.login_method, USER_LOGIN);
    svc.manager().cleanup();
}

#[tokio::test]
async fn failed_health_check_notifies_logged_out_state() {
    let mut device = Device::new(BrowserOutcome::Cancelled);
    device.config.recovery.browser_settle_ms = 0;
    let svc = device.boot();
    svc.manager()
        .set_login_status(Platform::TikTok, true, LoginMetadata::new())
        .await
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _sub = svc.manager().add_listener(move |states| sink.lock().push(*states));

    device.clock.advance(Duration::days(10));
    for _ in 0..4 {
        svc.recovery().perform_health_check().await;
    }

    assert!(!svc.manager().is_logged_in(Platform::TikTok));
    assert_eq!(seen.lock().len(), 1);
    assert!(!seen.lock()[0].tiktok);
    assert_eq!(device.browser.opened().len(), 1);
    svc.manager().cleanup();
}
