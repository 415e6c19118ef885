//! 단위 테스트용 하네스와 가짜 브라우저.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use reelgate_core::config::AppConfig;
use reelgate_core::error::CoreError;
use reelgate_core::models::platform::Platform;
use reelgate_core::models::session::LoginMetadata;
use reelgate_core::ports::browser::{BrowserOptions, BrowserOutcome, BrowserSurface};
use reelgate_core::ports::clock::{Clock, ManualClock};
use reelgate_core::ports::storage::KeyValueStore;
use reelgate_storage::memory::MemoryStore;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::manager::SessionManager;

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

pub(crate) struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub config: AppConfig,
    pub manager: SessionManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let manager = SessionManager::new(
            store.clone() as Arc<dyn KeyValueStore>,
            clock.clone() as Arc<dyn Clock>,
            &config,
        );
        Self {
            store,
            clock,
            config,
            manager,
        }
    }

    pub async fn login(&self, platform: Platform) {
        self.manager
            .set_login_status(platform, true, LoginMetadata::new())
            .await
            .unwrap();
    }
}

/// 미리 정한 결과를 순서대로 돌려주는 브라우저
pub(crate) struct ScriptedBrowser {
    script: Mutex<VecDeque<Result<BrowserOutcome, CoreError>>>,
    fallback: BrowserOutcome,
    hang: bool,
    opened: Mutex<Vec<String>>,
}

impl ScriptedBrowser {
    pub fn always(outcome: BrowserOutcome) -> Arc<Self> {
        Arc::new(Self::build(outcome, false))
    }

    /// 영원히 반환하지 않는 브라우저
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self::build(BrowserOutcome::Dismissed, true))
    }

    fn build(fallback: BrowserOutcome, hang: bool) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            hang,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, result: Result<BrowserOutcome, CoreError>) {
        self.script.lock().push_back(result);
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl BrowserSurface for ScriptedBrowser {
    async fn open(&self, url: &str, _options: &BrowserOptions) -> Result<BrowserOutcome, CoreError> {
        self.opened.lock().push(url.to_string());
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.script.lock().pop_front().unwrap_or(Ok(self.fallback))
    }
}
