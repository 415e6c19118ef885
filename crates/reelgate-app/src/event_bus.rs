//! 내부 이벤트 버스.
//!
//! `tokio::broadcast` 기반. 세션 관리자 구독과 모니터 관찰자를 하나의 스트림으로 모은다.

use reelgate_core::models::recovery::{HealthCheckEntry, HealthCheckReport};
use reelgate_core::models::session::LoginStates;
use reelgate_session::listeners::Subscription;
use reelgate_session::manager::SessionManager;
use reelgate_session::monitor::HealthObserver;
use reelgate_session::service::AppState;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// 내부 앱 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// 로그인 상태 변경
    LoginStatesChanged(LoginStates),
    /// 주기적 건강 검사 완료
    HealthChecked(HealthCheckReport),
    /// 호스트 앱 상태 전환
    AppStateChanged(AppState),
}

/// 내부 이벤트 버스
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 이벤트 발행 (구독자가 없으면 버림)
    pub fn publish(&self, event: SessionEvent) {
        debug!("이벤트 발행: {:?}", std::mem::discriminant(&event));
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// 세션 관리자 상태 변경을 버스로 전달
    pub fn bridge_manager(&self, manager: &SessionManager) -> Subscription {
        let bus = self.clone();
        manager.add_listener(move |states| bus.publish(SessionEvent::LoginStatesChanged(*states)))
    }

    /// 모니터 관찰자 생성
    pub fn health_observer(&self) -> HealthObserver {
        let bus = self.clone();
        Arc::new(move |report: &HealthCheckReport| {
            bus.publish(SessionEvent::HealthChecked(report.clone()))
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// 이벤트를 로그로 남기는 소비 루프 (버스가 닫히면 종료)
pub async fn log_events(mut rx: broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(SessionEvent::LoginStatesChanged(states)) => {
                info!(
                    youtube = states.youtube,
                    tiktok = states.tiktok,
                    instagram = states.instagram,
                    "로그인 상태 변경"
                );
            }
            Ok(SessionEvent::HealthChecked(report)) => {
                let needs_login = report
                    .values()
                    .filter(|entry| match entry {
                        HealthCheckEntry::Recovery(outcome) => !outcome.status.is_recovered(),
                        _ => false,
                    })
                    .count();
                info!(needs_login, "건강 검사 이벤트");
            }
            Ok(SessionEvent::AppStateChanged(state)) => {
                info!(?state, "앱 상태 이벤트");
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "이벤트 수신 지연 — 일부 건너뜀");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
