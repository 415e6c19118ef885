//! 세션 서비스 오케스트레이션.
//!
//! 관리자, 복구 엔진, 백업, 모니터를 묶어 실행 순서와 앱 상태 훅을 처리한다.
//!
//! 실행 순서:
//! 1. 자동 복구 — 저장된 레코드 기준으로 무효 세션 치유
//! 2. `load_all` — 남은 무효 세션 정리, 상태 적재, 구독자 알림
//! 3. 백업 복원 (설정 시) — 로그인되지 않은 플랫폼만
//! 4. 백업 생성
//! 5. 백그라운드 모니터 시작

use parking_lot::Mutex;
use reelgate_core::config::AppConfig;
use reelgate_core::error::CoreError;
use reelgate_core::models::backup::{RestoreReport, SessionBackupSnapshot};
use reelgate_core::models::recovery::{HealthCheckReport, RecoveryReport};
use reelgate_core::models::session::LoginStates;
use reelgate_core::ports::browser::BrowserSurface;
use reelgate_core::ports::clock::Clock;
use reelgate_core::ports::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backup::BackupService;
use crate::manager::SessionManager;
use crate::monitor::{HealthObserver, SessionMonitor};
use crate::recovery::RecoveryEngine;

/// 호스트 앱 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Active,
    Background,
    Inactive,
}

/// 앱 상태 전환에 대한 처리 결과
#[derive(Debug, Clone, PartialEq)]
pub enum AppStateOutcome {
    /// 포그라운드 복귀 — 즉시 건강 검사
    HealthChecked(HealthCheckReport),
    /// 백그라운드 진입 — 백업 스냅샷
    BackedUp(SessionBackupSnapshot),
    /// 처리 없음 (설정으로 비활성, 또는 실패)
    Skipped,
}

/// 실행 결과 요약
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchReport {
    /// 자동 복구 결과 (이미 진행 중이었으면 None)
    pub recovery: Option<RecoveryReport>,
    pub states: LoginStates,
    /// 복원 결과 (비활성/스냅샷 없음/오래됨이면 None)
    pub restore: Option<RestoreReport>,
    pub backup: Option<SessionBackupSnapshot>,
}

struct MonitorTask {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 세션 서비스
pub struct SessionService {
    manager: SessionManager,
    recovery: RecoveryEngine,
    backup: BackupService,
    config: AppConfig,
    monitor: Mutex<Option<MonitorTask>>,
}

impl SessionService {
    /// 포트 구현을 받아 서비스 구성
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        browser: Arc<dyn BrowserSurface>,
        config: AppConfig,
    ) -> Self {
        let manager = SessionManager::new(store, clock, &config);
        let recovery = RecoveryEngine::new(manager.clone(), browser, &config.recovery);
        let backup = BackupService::new(manager.clone(), &config.backup);
        Self {
            manager,
            recovery,
            backup,
            config,
            monitor: Mutex::new(None),
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn recovery(&self) -> &RecoveryEngine {
        &self.recovery
    }

    pub fn backup(&self) -> &BackupService {
        &self.backup
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 실행 순서 수행 (모니터 시작 제외)
    pub async fn initialize(&self) -> LaunchReport {
        let recovery = self.recovery.attempt_auto_recovery().await;
        let mut states = self.manager.load_all().await;

        let restore = if self.config.backup.restore_on_launch {
            match self.backup.restore_session_backup().await {
                Ok(report) => report,
                Err(e) => {
                    warn!("세션 백업 복원 실패: {e}");
                    None
                }
            }
        } else {
            None
        };
        if restore.is_some() {
            states = self.manager.login_states();
        }

        let backup = match self.backup.create_session_backup().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("실행 시 세션 백업 실패: {e}");
                None
            }
        };

        info!(
            logged_in = states.logged_in_count(),
            restored = restore.as_ref().map_or(0, |r| r.len()),
            "세션 서비스 초기화 완료"
        );

        LaunchReport {
            recovery,
            states,
            restore,
            backup,
        }
    }

    /// 초기화 후 백그라운드 모니터 시작
    pub async fn launch(&self) -> LaunchReport {
        let report = self.initialize().await;
        self.start_monitor(None);
        report
    }

    /// 백그라운드 모니터 시작 (이미 동작 중이면 무시)
    pub fn start_monitor(&self, observer: Option<HealthObserver>) {
        let mut slot = self.monitor.lock();
        if slot.is_some() {
            return;
        }

        let mut monitor = SessionMonitor::new(self.recovery.clone(), &self.config.monitor);
        if let Some(observer) = observer {
            monitor = monitor.with_observer(observer);
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = monitor.spawn(shutdown_rx);
        *slot = Some(MonitorTask {
            shutdown_tx,
            handle,
        });
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// 앱 상태 전환 처리
    pub async fn on_app_state_change(&self, state: AppState) -> AppStateOutcome {
        info!(?state, "앱 상태 변경");
        match state {
            AppState::Active => {
                AppStateOutcome::HealthChecked(self.recovery.perform_health_check().await)
            }
            AppState::Background | AppState::Inactive => {
                if !self.config.backup.backup_on_background {
                    return AppStateOutcome::Skipped;
                }
                match self.backup.create_session_backup().await {
                    Ok(snapshot) => AppStateOutcome::BackedUp(snapshot),
                    Err(e) => {
                        warn!("백그라운드 진입 백업 실패: {e}");
                        AppStateOutcome::Skipped
                    }
                }
            }
        }
    }

    /// 종료 — 모니터 중지, 마지막 백업, 관리자 정리
    pub async fn shutdown(&self) -> Result<(), CoreError> {
        let task = self.monitor.lock().take();
        if let Some(task) = task {
            let _ = task.shutdown_tx.send(true);
            if let Err(e) = task.handle.await {
                warn!("세션 모니터 종료 대기 실패: {e}");
            }
        }

        let result = self.backup.create_session_backup().await.map(|_| ());
        self.manager.cleanup();
        info!("세션 서비스 종료");
        result
    }
}
