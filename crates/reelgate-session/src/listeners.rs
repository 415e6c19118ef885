//! 로그인 상태 변경 구독 레지스트리.
//!
//! 등록 순서대로 호출하며, 한 구독자의 패닉은 다른 구독자 알림을 막지 않는다.

use parking_lot::RwLock;
use reelgate_core::models::session::LoginStates;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::warn;

/// 상태 변경 콜백
pub type Listener = Arc<dyn Fn(&LoginStates) + Send + Sync>;

/// 구독 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
struct RegistryInner {
    next_id: AtomicU64,
    entries: RwLock<Vec<(ListenerId, Listener)>>,
}

impl RegistryInner {
    fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// 구독 레지스트리
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<RegistryInner>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 구독자 등록
    pub fn add<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LoginStates) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.entries.write().push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// 모든 구독자에게 상태 전달
    ///
    /// 잠금을 풀고 호출하므로 콜백 안에서 구독/해지해도 교착되지 않는다.
    pub fn notify(&self, states: &LoginStates) {
        let snapshot: Vec<(ListenerId, Listener)> = self.inner.entries.read().clone();
        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(states))).is_err() {
                warn!(listener = id.0, "로그인 상태 구독자 패닉 — 다음 구독자로 계속");
            }
        }
    }

    /// 등록된 구독자 수
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 전체 구독 해지
    pub fn clear(&self) {
        self.inner.entries.write().clear();
    }
}

/// 구독 핸들
///
/// drop해도 해지되지 않는다. 해지는 `unsubscribe`로 명시한다.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<RegistryInner>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// 구독 해지 (이미 해지됐으면 false)
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .map(|inner| inner.remove(self.id))
            .unwrap_or(false)
    }
}
