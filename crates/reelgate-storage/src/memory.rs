//! 인메모리 키-값 저장소.
//!
//! 테스트 및 `--ephemeral` 실행용. 쓰기 실패 주입을 지원한다.

use async_trait::async_trait;
use parking_lot::RwLock;
use reelgate_core::error::CoreError;
use reelgate_core::ports::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 인메모리 저장소 — `KeyValueStore` 포트 구현
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    fail_writes: AtomicBool,
    write_count: AtomicU64,
}

impl MemoryStore {
    /// 빈 저장소 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후 모든 쓰기(set/remove)를 실패시킨다
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 성공한 쓰기 횟수
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// 저장된 항목 수
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// 값 직접 조회 (동기)
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn check_writable(&self, op: &str, key: &str) -> Result<(), CoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!("쓰기 실패 주입 ({op} {key})")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.check_writable("set", key)?;
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.check_writable("remove", key)?;
        self.entries.write().remove(key);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), CoreError> {
        if let Some(first) = keys.first() {
            self.check_writable("remove_many", first)?;
        }
        let mut entries = self.entries.write();
        for key in keys {
            entries.remove(key);
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basic_operations() {
        let store = MemoryStore::new();
        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();

        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);

        store.remove("a").await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn injected_write_failure() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();

        store.set_fail_writes(true);
        let err = store.set("k", "w").await.unwrap_err();
        assert!(err.is_persistence());
        assert!(store.remove("k").await.is_err());

        // 읽기는 계속 동작
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.set_fail_writes(false);
        store.set("k", "w").await.unwrap();
        assert_eq!(store.peek("k").as_deref(), Some("w"));
    }
}
