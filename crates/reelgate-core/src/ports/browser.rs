//! 외부 브라우저 표면 포트.
//!
//! 구현: `reelgate-app` crate (시스템 브라우저), 테스트용 스크립트 브라우저.
//! 쿠키 기반 보조 복구 경로에서만 사용된다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 브라우저 표시 옵션
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    /// 제목 표시 여부
    pub show_title: bool,
    /// 최근 항목에 남길지 여부
    pub show_in_recents: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            show_title: false,
            show_in_recents: false,
        }
    }
}

/// 브라우저 종료 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserOutcome {
    /// 사용자가 닫음
    Dismissed,
    /// 명시적 취소
    Cancelled,
    /// 정상 완료
    Completed,
}

impl BrowserOutcome {
    /// 쿠키 세션 확인 신호로 취급할지 (취소만 부정)
    pub fn is_positive(self) -> bool {
        !matches!(self, BrowserOutcome::Cancelled)
    }
}

/// 외부/임베드 브라우저
#[async_trait]
pub trait BrowserSurface: Send + Sync {
    /// URL을 열고 사용자가 돌아올 때까지 대기
    async fn open(&self, url: &str, options: &BrowserOptions) -> Result<BrowserOutcome, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancel_is_negative() {
        assert!(BrowserOutcome::Dismissed.is_positive());
        assert!(BrowserOutcome::Completed.is_positive());
        assert!(!BrowserOutcome::Cancelled.is_positive());
    }
}
