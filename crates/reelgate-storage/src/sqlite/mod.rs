//! SQLite 저장소 어댑터.
//!
//! `KeyValueStore` 포트 구현. 단일 `kv` 테이블에 키별 문자열 값을 저장한다.

use async_trait::async_trait;
use chrono::Utc;
use reelgate_core::error::CoreError;
use reelgate_core::ports::storage::KeyValueStore;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::migration;

/// SQLite 키-값 저장소 — `KeyValueStore` 포트 구현
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// 파일 기반 SQLite 저장소 생성
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Storage(format!("SQLite 열기 실패: {e}")))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            ",
        )
        .map_err(|e| CoreError::Storage(format!("PRAGMA 설정 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        info!("SQLite 저장소 초기화: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Storage(format!("인메모리 SQLite 생성 실패: {e}")))?;

        migration::run_migrations(&conn)
            .map_err(|e| CoreError::Storage(format!("마이그레이션 실패: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 저장된 항목 수
    pub fn len(&self) -> Result<usize, CoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .map_err(|e| CoreError::Storage(format!("항목 수 조회 실패: {e}")))?;
        Ok(count as usize)
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> Result<bool, CoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|e| CoreError::Internal(format!("잠금 획득 실패: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| CoreError::Storage(format!("값 조회 실패 ({key}): {e}")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let updated_at = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, updated_at],
        )
        .map_err(|e| CoreError::Storage(format!("값 저장 실패 ({key}): {e}")))?;

        debug!("값 저장: {key} ({} bytes)", value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])
            .map_err(|e| CoreError::Storage(format!("값 삭제 실패 ({key}): {e}")))?;

        debug!("값 삭제: {key}");
        Ok(())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), CoreError> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| CoreError::Storage(format!("트랜잭션 시작 실패: {e}")))?;

        {
            let mut stmt = tx
                .prepare_cached("DELETE FROM kv WHERE key = ?1")
                .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;

            for key in keys {
                stmt.execute(rusqlite::params![key])
                    .map_err(|e| CoreError::Storage(format!("일괄 삭제 실패 ({key}): {e}")))?;
            }
        }

        tx.commit()
            .map_err(|e| CoreError::Storage(format!("트랜잭션 커밋 실패: {e}")))?;

        debug!("값 일괄 삭제: {}개", keys.len());
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT key FROM kv ORDER BY key")
            .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;

        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CoreError::Storage(format!("쿼리 실행 실패: {e}")))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = SqliteKvStore::open_in_memory().unwrap();

        assert_eq!(store.get("login_youtube").await.unwrap(), None);

        store.set("login_youtube", "{}").await.unwrap();
        assert_eq!(
            store.get("login_youtube").await.unwrap().as_deref(),
            Some("{}")
        );

        store.remove("login_youtube").await.unwrap();
        assert_eq!(store.get("login_youtube").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = SqliteKvStore::open_in_memory().unwrap();

        store.set("k", "a").await.unwrap();
        store.set("k", "b").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("b"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_missing_key_is_noop() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.remove("nothing").await.unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn remove_many_and_list_keys() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        for key in ["login_youtube", "login_tiktok", "session_backup"] {
            store.set(key, "x").await.unwrap();
        }

        store
            .remove_many(&["login_youtube".to_string(), "login_tiktok".to_string()])
            .await
            .unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["session_backup"]);
    }

    #[tokio::test]
    async fn remove_many_empty_slice() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("k", "v").await.unwrap();
        store.remove_many(&[]).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }
}
