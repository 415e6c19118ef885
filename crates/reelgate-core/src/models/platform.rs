//! 플랫폼 식별자.
//!
//! 임베드 대상 영상 플랫폼과 플랫폼별 URL 카탈로그.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 임베드 대상 플랫폼 (세션 레코드의 불변 식별자)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// YouTube Shorts
    #[serde(rename = "youtube")]
    YouTube,
    /// TikTok
    #[serde(rename = "tiktok")]
    TikTok,
    /// Instagram Reels
    Instagram,
}

impl Platform {
    /// 전체 플랫폼 (고정 순서)
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::TikTok, Platform::Instagram];

    /// 저장소 키에 쓰이는 식별자
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::TikTok => "tiktok",
            Platform::Instagram => "instagram",
        }
    }

    /// 사용자 표시용 이름
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
            Platform::Instagram => "Instagram",
        }
    }

    /// 배열 인덱스 (플랫폼별 잠금/타이머 슬롯)
    pub fn index(self) -> usize {
        match self {
            Platform::YouTube => 0,
            Platform::TikTok => 1,
            Platform::Instagram => 2,
        }
    }

    /// 로그인 페이지 URL
    pub fn login_url(self) -> &'static str {
        match self {
            Platform::YouTube => {
                "https://accounts.google.com/signin/v2/identifier?continue=https%3A%2F%2Fwww.youtube.com%2F"
            }
            Platform::TikTok => "https://www.tiktok.com/login/phone-or-email/email",
            Platform::Instagram => "https://www.instagram.com/accounts/login/",
        }
    }

    /// 쿠키 확인용 URL (보조 복구 경로에서 브라우저로 연다)
    pub fn verify_url(self) -> &'static str {
        match self {
            Platform::YouTube => "https://m.youtube.com/",
            Platform::TikTok => "https://www.tiktok.com/foryou",
            Platform::Instagram => "https://www.instagram.com/",
        }
    }

    /// 개인화 피드 URL
    pub fn personalized_url(self) -> &'static str {
        self.verify_url()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" | "yt" => Ok(Platform::YouTube),
            "tiktok" | "tt" => Ok(Platform::TikTok),
            "instagram" | "ig" => Ok(Platform::Instagram),
            other => Err(CoreError::NotFound {
                resource_type: "Platform".to_string(),
                id: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.as_str().parse().unwrap();
            assert_eq!(parsed, platform);
            assert_eq!(platform.to_string(), platform.as_str());
        }
        assert_eq!("IG".parse::<Platform>().unwrap(), Platform::Instagram);
    }

    #[test]
    fn unknown_platform_rejected() {
        let err = "myspace".parse::<Platform>().unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn serde_uses_lowercase_ids() {
        assert_eq!(serde_json::to_string(&Platform::YouTube).unwrap(), r#""youtube""#);
        assert_eq!(serde_json::to_string(&Platform::TikTok).unwrap(), r#""tiktok""#);
        assert_eq!(
            serde_json::from_str::<Platform>(r#""instagram""#).unwrap(),
            Platform::Instagram
        );
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 3];
        for platform in Platform::ALL {
            assert!(!seen[platform.index()]);
            seen[platform.index()] = true;
        }
    }
}
