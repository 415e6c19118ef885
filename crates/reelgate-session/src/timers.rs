//! 플랫폼별 활동 타이머.
//!
//! 로그인된 플랫폼마다 하나의 tokio 태스크가 주기적으로 틱 콜백을 실행한다.
//! 콜백이 false를 반환하면 타이머가 스스로 종료한다.

use parking_lot::Mutex;
use reelgate_core::models::platform::Platform;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

#[derive(Default)]
pub(crate) struct ActivityTimers {
    handles: Mutex<BTreeMap<Platform, JoinHandle<()>>>,
}

impl ActivityTimers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 타이머 시작 (기존 타이머는 교체)
    ///
    /// 첫 틱은 `period` 후에 실행된다. tokio 런타임 안에서 호출해야 한다.
    pub(crate) fn start<F, Fut>(&self, platform: Platform, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !tick().await {
                    debug!(%platform, "활동 타이머 자체 종료");
                    break;
                }
            }
        });

        if let Some(previous) = self.handles.lock().insert(platform, handle) {
            previous.abort();
        }
        debug!(%platform, period_secs = period.as_secs(), "활동 타이머 시작");
    }

    /// 타이머 중지 (실행 중이었으면 true)
    pub(crate) fn stop(&self, platform: Platform) -> bool {
        match self.handles.lock().remove(&platform) {
            Some(handle) => {
                handle.abort();
                debug!(%platform, "활동 타이머 중지");
                true
            }
            None => false,
        }
    }

    pub(crate) fn stop_all(&self) {
        let mut handles = self.handles.lock();
        for (_, handle) in std::mem::take(&mut *handles) {
            handle.abort();
        }
    }

    /// 동작 중인 타이머 목록
    pub(crate) fn active(&self) -> Vec<Platform> {
        self.handles
            .lock()
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(platform, _)| *platform)
            .collect()
    }

    pub(crate) fn is_running(&self, platform: Platform) -> bool {
        self.handles
            .lock()
            .get(&platform)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ActivityTimers {
    fn drop(&mut self) {
        for (_, handle) in std::mem::take(self.handles.get_mut()) {
            handle.abort();
        }
    }
}
