//! 영속 키-값 저장소 포트.
//!
//! 구현: `reelgate-storage` crate (rusqlite, 인메모리)
//!
//! 같은 프로세스 안에서 최소한 read-your-writes 일관성을 보장해야 한다.

use async_trait::async_trait;

use crate::error::CoreError;

/// 키-값 저장소
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 값 조회 (없으면 None)
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// 값 저장 (덮어쓰기)
    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// 값 삭제 (없는 키는 무시)
    async fn remove(&self, key: &str) -> Result<(), CoreError>;

    /// 여러 키 삭제
    async fn remove_many(&self, keys: &[String]) -> Result<(), CoreError>;

    /// 전체 키 목록
    async fn list_keys(&self) -> Result<Vec<String>, CoreError>;
}
