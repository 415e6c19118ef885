//! # reelgate-session
//!
//! 플랫폼별 로그인 세션의 라이프사이클 코어.
//!
//! ## 모듈
//! - `validator`: 세션 유효성 판정 (순수 함수)
//! - `manager`: 로그인 상태 관리, 변경 알림, 활동 타이머
//! - `recovery`: 만료 세션 자동 복구 (조용한 갱신 → 쿠키 확인)
//! - `backup`: 유효 세션 스냅샷 및 실행 시 복원
//! - `monitor`: 주기적 건강 검사
//! - `detection`: 웹뷰 URL 기반 로그인 완료 감지
//! - `service`: 실행 순서 오케스트레이션, 앱 상태 훅

pub mod backup;
pub mod detection;
pub mod listeners;
pub mod manager;
pub mod monitor;
pub mod recovery;
pub mod service;
mod timers;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;
