//! Reelgate 도메인 모델.
//!
//! 플랫폼별 세션 레코드, 복구 카운터, 백업 스냅샷, 건강 리포트 구조체를 정의한다.
//! 모든 영속 모델은 `serde` Serialize/Deserialize를 구현한다 (JSON, camelCase).

pub mod backup;
pub mod health;
pub mod platform;
pub mod recovery;
pub mod session;
