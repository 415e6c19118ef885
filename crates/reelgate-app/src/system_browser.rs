//! 시스템 브라우저 어댑터.
//!
//! OS 기본 브라우저로 URL을 연다. 런처 프로세스가 정상 종료하면 사용자가
//! 페이지를 보고 돌아온 것(`Dismissed`)으로, 실패하면 `Cancelled`로 본다.

use async_trait::async_trait;
use reelgate_core::error::CoreError;
use reelgate_core::ports::browser::{BrowserOptions, BrowserOutcome, BrowserSurface};
use tokio::process::Command;
use tracing::{debug, info};

/// OS 기본 브라우저
#[derive(Debug, Clone, Default)]
pub struct SystemBrowser;

impl SystemBrowser {
    pub fn new() -> Self {
        Self
    }

    fn launcher(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        }

        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(url);
            cmd
        }

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

#[async_trait]
impl BrowserSurface for SystemBrowser {
    async fn open(&self, url: &str, options: &BrowserOptions) -> Result<BrowserOutcome, CoreError> {
        debug!(url, show_title = options.show_title, "시스템 브라우저 열기");

        let status = Self::launcher(url)
            .status()
            .await
            .map_err(|e| CoreError::Browser(format!("브라우저 실행 실패: {e}")))?;

        if status.success() {
            Ok(BrowserOutcome::Dismissed)
        } else {
            info!(code = ?status.code(), "브라우저 런처 비정상 종료");
            Ok(BrowserOutcome::Cancelled)
        }
    }
}

/// 브라우저를 띄우지 않는 표면 (`--no-browser`) — 항상 취소
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessBrowser;

#[async_trait]
impl BrowserSurface for HeadlessBrowser {
    async fn open(&self, url: &str, _options: &BrowserOptions) -> Result<BrowserOutcome, CoreError> {
        debug!(url, "브라우저 비활성 — 쿠키 확인 건너뜀");
        Ok(BrowserOutcome::Cancelled)
    }
}
