//! `run` 모드의 종료 제어.
//!
//! SIGINT/SIGTERM(윈도우는 Ctrl+C)을 기다렸다가 종료 원인을 watch 채널에 남긴다.

use std::fmt;
use std::io;
use tokio::sync::watch;
use tracing::info;

/// 종료 원인
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    Interrupt,
    Terminate,
    /// 코드에서 직접 요청
    Requested,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownCause::Interrupt => "SIGINT",
            ShutdownCause::Terminate => "SIGTERM",
            ShutdownCause::Requested => "requested",
        })
    }
}

pub struct LifecycleManager {
    cause: watch::Sender<Option<ShutdownCause>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            cause: watch::Sender::new(None),
        }
    }

    /// 기록된 종료 원인 (아직 실행 중이면 None)
    pub fn cause(&self) -> Option<ShutdownCause> {
        *self.cause.borrow()
    }

    /// 종료 요청. 먼저 기록된 원인이 남으며, 새로 기록했으면 `true`.
    pub fn request_shutdown(&self, cause: ShutdownCause) -> bool {
        let recorded = self.cause.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(cause);
            true
        });
        if recorded {
            info!(%cause, "종료 요청");
        }
        recorded
    }

    /// OS 시그널을 기다린 뒤 종료 원인 반환
    pub async fn wait_for_signal(&self) -> io::Result<ShutdownCause> {
        let received = os_signal().await?;
        self.request_shutdown(received);
        Ok(self.cause().unwrap_or(received))
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn os_signal() -> io::Result<ShutdownCause> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(tokio::select! {
        _ = interrupt.recv() => ShutdownCause::Interrupt,
        _ = terminate.recv() => ShutdownCause::Terminate,
    })
}

#[cfg(not(unix))]
async fn os_signal() -> io::Result<ShutdownCause> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownCause::Interrupt)
}
