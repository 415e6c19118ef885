//! 웹뷰 로그인 완료 감지.
//!
//! 임베디드 브라우저의 내비게이션 URL을 플랫폼별 패턴으로 분류한다.
//! 성공 패턴과 일치하고 `login`/`signin`을 포함하지 않는 URL이면 로그인 완료로 본다.

use reelgate_core::models::platform::Platform;
use reelgate_core::models::session::LoginMetadata;
use serde::{Deserialize, Serialize};
use url::Url;

/// 감지된 로그인의 저장 방식
pub const DETECTED_LOGIN_METHOD: &str = "realWebView";

/// 로그인 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStep {
    /// 로그인/인증 페이지
    Login,
    /// 피드 도달 — 사용자 확인 대기
    Verify,
}

/// 감지 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// URL 패턴 일치
    UrlPattern,
    /// 사용자가 직접 완료를 확인
    Manual,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::UrlPattern => "url_pattern",
            DetectionMethod::Manual => "manual",
        }
    }
}

/// 로그인 완료 신호
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSignal {
    pub platform: Platform,
    pub method: DetectionMethod,
    pub url: String,
}

impl LoginSignal {
    /// 사용자가 확인 버튼으로 완료를 알린 경우
    pub fn manual(platform: Platform, url: impl Into<String>) -> Self {
        Self {
            platform,
            method: DetectionMethod::Manual,
            url: url.into(),
        }
    }

    /// `set_login_status`에 넘길 메타데이터
    pub fn into_metadata(self) -> LoginMetadata {
        LoginMetadata::method(DETECTED_LOGIN_METHOD)
            .with("detectionMethod", self.method.as_str())
            .with("detectedUrl", self.url)
    }
}

/// 플랫폼별 로그인 감지기
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginDetector {
    platform: Platform,
}

impl LoginDetector {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// 로그인 완료로 볼 `host/path` 접두 패턴
    pub fn success_patterns(&self) -> &'static [&'static str] {
        match self.platform {
            Platform::YouTube => &["youtube.com/", "youtube.com/feed"],
            Platform::TikTok => &["tiktok.com/foryou", "tiktok.com/following"],
            Platform::Instagram => &["instagram.com/"],
        }
    }

    /// 내비게이션 URL 분류 (파싱 불가/무관한 URL은 None)
    pub fn classify(&self, raw_url: &str) -> Option<LoginStep> {
        let url = Url::parse(raw_url).ok()?;
        let lowered = raw_url.to_ascii_lowercase();

        if url.host_str() == Some("accounts.google.com") || mentions_login(&lowered) {
            return Some(LoginStep::Login);
        }
        if self.matches_success(&url) {
            return Some(LoginStep::Verify);
        }
        None
    }

    /// 로그인 완료 감지
    pub fn detect(&self, raw_url: &str) -> Option<LoginSignal> {
        let url = Url::parse(raw_url).ok()?;
        if mentions_login(&raw_url.to_ascii_lowercase()) || !self.matches_success(&url) {
            return None;
        }
        Some(LoginSignal {
            platform: self.platform,
            method: DetectionMethod::UrlPattern,
            url: raw_url.to_string(),
        })
    }

    fn matches_success(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(host.as_str());
        let location = format!("{host}{}", url.path().to_ascii_lowercase());

        self.success_patterns()
            .iter()
            .any(|pattern| location.starts_with(pattern))
    }
}

fn mentions_login(lowered_url: &str) -> bool {
    lowered_url.contains("login") || lowered_url.contains("signin")
}
