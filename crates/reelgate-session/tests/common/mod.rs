//! 통합 테스트 공용 픽스처.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use reelgate_core::config::AppConfig;
use reelgate_core::error::CoreError;
use reelgate_core::ports::browser::{BrowserOptions, BrowserOutcome, BrowserSurface};
use reelgate_core::ports::clock::ManualClock;
use reelgate_core::ports::storage::KeyValueStore;
use reelgate_session::service::SessionService;
use reelgate_storage::memory::MemoryStore;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 11, 20, 30, 0).unwrap()
}

/// 순서대로 결과를 돌려주고 열린 URL을 기록하는 브라우저
pub struct RecordingBrowser {
    script: Mutex<VecDeque<BrowserOutcome>>,
    fallback: BrowserOutcome,
    opened: Mutex<Vec<String>>,
}

impl RecordingBrowser {
    pub fn new(fallback: BrowserOutcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn queue(&self, outcome: BrowserOutcome) {
        self.script.lock().push_back(outcome);
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl BrowserSurface for RecordingBrowser {
    async fn open(&self, url: &str, _options: &BrowserOptions) -> Result<BrowserOutcome, CoreError> {
        self.opened.lock().push(url.to_string());
        Ok(self.script.lock().pop_front().unwrap_or(self.fallback))
    }
}

/// 지정한 키의 다음 읽기를 풀어 줄 때까지 붙잡는 스토어
pub struct GatedStore {
    inner: MemoryStore,
    armed: Mutex<Option<String>>,
    paused: Notify,
    release: Notify,
}

impl GatedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            armed: Mutex::new(None),
            paused: Notify::new(),
            release: Notify::new(),
        })
    }

    pub fn arm(&self, key: impl Into<String>) {
        *self.armed.lock() = Some(key.into());
    }

    /// 붙잡힌 읽기가 생길 때까지 대기
    pub async fn wait_paused(&self) {
        self.paused.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let hold = {
            let mut armed = self.armed.lock();
            if armed.as_deref() == Some(key) {
                armed.take();
                true
            } else {
                false
            }
        };
        if hold {
            self.paused.notify_one();
            self.release.notified().await;
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.inner.remove(key).await
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), CoreError> {
        self.inner.remove_many(keys).await
    }

    async fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        self.inner.list_keys().await
    }
}

/// 열린 뒤 풀어 줄 때까지 결과를 돌려주지 않는 브라우저
pub struct GatedBrowser {
    outcome: BrowserOutcome,
    opened: Notify,
    release: Notify,
}

impl GatedBrowser {
    pub fn new(outcome: BrowserOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            opened: Notify::new(),
            release: Notify::new(),
        })
    }

    pub async fn wait_opened(&self) {
        self.opened.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl BrowserSurface for GatedBrowser {
    async fn open(&self, _url: &str, _options: &BrowserOptions) -> Result<BrowserOutcome, CoreError> {
        self.opened.notify_one();
        self.release.notified().await;
        Ok(self.outcome)
    }
}

/// 공유 스토어/시계 위에서 앱 "실행"을 반복하는 픽스처
pub struct Device {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub browser: Arc<RecordingBrowser>,
    pub config: AppConfig,
}

impl Device {
    pub fn new(fallback: BrowserOutcome) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(ManualClock::new(start_time())),
            browser: RecordingBrowser::new(fallback),
            config: AppConfig::default_config(),
        }
    }

    /// 같은 저장소로 새 프로세스 시작
    pub fn boot(&self) -> SessionService {
        SessionService::new(
            self.store.clone(),
            self.clock.clone(),
            self.browser.clone(),
            self.config.clone(),
        )
    }
}
