//! # reelgate-storage
//!
//! 로컬 저장소 어댑터.
//! 세션 레코드, 복구 카운터, 백업 스냅샷을 문자열 값으로 보관하는
//! `KeyValueStore` 포트 구현을 제공한다.
//!
//! ## 모듈
//! - `sqlite`: SQLite 키-값 저장소 (앱 실행용)
//! - `memory`: 인메모리 저장소 (테스트, `--ephemeral` 실행용)
//! - `migration`: 스키마 마이그레이션

pub mod memory;
pub mod migration;
pub mod sqlite;
