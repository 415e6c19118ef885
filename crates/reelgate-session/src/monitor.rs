//! 백그라운드 세션 모니터.
//!
//! 주기적으로 로그인된 플랫폼의 건강 검사(검증 + 필요 시 복구)를 실행한다.
//! 종료 신호(`watch`)를 받으면 즉시 루프를 빠져나온다.

use reelgate_core::config::MonitorConfig;
use reelgate_core::models::recovery::{HealthCheckEntry, HealthCheckReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::recovery::RecoveryEngine;

/// 건강 검사 결과 관찰자
pub type HealthObserver = Arc<dyn Fn(&HealthCheckReport) + Send + Sync>;

/// 세션 모니터
pub struct SessionMonitor {
    recovery: RecoveryEngine,
    interval: Duration,
    observer: Option<HealthObserver>,
}

impl SessionMonitor {
    pub fn new(recovery: RecoveryEngine, config: &MonitorConfig) -> Self {
        Self {
            recovery,
            interval: config.health_check_interval(),
            observer: None,
        }
    }

    /// 검사마다 결과를 전달받을 관찰자 등록
    pub fn with_observer(mut self, observer: HealthObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// 백그라운드 태스크로 실행
    pub fn spawn(self, shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown_rx))
    }

    /// 모니터 루프 — 첫 검사는 한 주기 뒤
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "세션 모니터 시작");

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.recovery.perform_health_check().await;
                    log_report(&report);
                    if let Some(observer) = &self.observer {
                        observer(&report);
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("세션 모니터 종료");
                        break;
                    }
                }
            }
        }
    }
}

fn log_report(report: &HealthCheckReport) {
    for (platform, entry) in report {
        match entry {
            HealthCheckEntry::NotLoggedIn | HealthCheckEntry::Healthy => {
                debug!(%platform, ?entry, "건강 검사");
            }
            HealthCheckEntry::Recovery(outcome) if outcome.status.is_recovered() => {
                info!(%platform, status = ?outcome.status, "건강 검사 — 세션 복구됨");
            }
            HealthCheckEntry::Recovery(outcome) => {
                warn!(%platform, status = ?outcome.status, "건강 검사 — 수동 로그인 필요");
            }
        }
    }
}
