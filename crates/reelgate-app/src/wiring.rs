//! DI 와이어링.
//!
//! 설정 → 저장소 → 브라우저 → 세션 서비스 순으로 어댑터를 조립한다.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use reelgate_core::config::AppConfig;
use reelgate_core::config_manager::ConfigManager;
use reelgate_core::ports::browser::BrowserSurface;
use reelgate_core::ports::clock::SystemClock;
use reelgate_core::ports::storage::KeyValueStore;
use reelgate_session::service::SessionService;
use reelgate_storage::memory::MemoryStore;
use reelgate_storage::sqlite::SqliteKvStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::system_browser::{HeadlessBrowser, SystemBrowser};

/// DB 파일 이름
const DB_FILE_NAME: &str = "reelgate.db";

/// CLI에서 넘어온 와이어링 옵션
#[derive(Debug, Clone, Default)]
pub struct WiringOptions {
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub ephemeral: bool,
    pub no_browser: bool,
}

/// 조립된 앱
pub struct App {
    pub service: SessionService,
    pub config_manager: ConfigManager,
    /// 로그용 저장소 위치 설명
    pub store_location: String,
}

/// 데이터베이스 경로 결정 (CLI 인자 → 설정 → 플랫폼별 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.reelgate.reelgate/reelgate.db`
/// - Windows: `%APPDATA%\reelgate\reelgate\data\reelgate.db`
/// - Linux: `~/.local/share/reelgate/reelgate.db`
pub fn resolve_db_path(data_dir: Option<&Path>, config: &AppConfig) -> PathBuf {
    data_dir
        .map(|d| d.join(DB_FILE_NAME))
        .or_else(|| config.storage.db_path.clone())
        .or_else(|| {
            ProjectDirs::from("com", "reelgate", "reelgate")
                .map(|p| p.data_dir().join(DB_FILE_NAME))
        })
        .unwrap_or_else(|| PathBuf::from(".").join(DB_FILE_NAME))
}

/// 설정 관리자 생성
///
/// 명시한 경로가 없으면 플랫폼 설정 디렉토리, 실패 시 데이터 디렉토리의 config.json.
pub fn load_config(options: &WiringOptions) -> Result<ConfigManager> {
    if let Some(path) = &options.config_path {
        return ConfigManager::with_path(path.clone())
            .with_context(|| format!("설정 로드 실패: {}", path.display()));
    }

    match ConfigManager::new() {
        Ok(manager) => Ok(manager),
        Err(e) => {
            let fallback_dir = options
                .data_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            warn!("설정 관리자 생성 실패, 대체 경로 사용: {e}");
            let fallback_path = fallback_dir.join("config.json");
            ConfigManager::with_path(fallback_path.clone())
                .with_context(|| format!("설정 로드 실패: {}", fallback_path.display()))
        }
    }
}

/// 저장소 생성
pub fn open_store(
    options: &WiringOptions,
    config: &AppConfig,
) -> Result<(Arc<dyn KeyValueStore>, String)> {
    if options.ephemeral {
        info!("인메모리 저장소 사용");
        return Ok((Arc::new(MemoryStore::new()), "memory".to_string()));
    }

    let db_path = resolve_db_path(options.data_dir.as_deref(), config);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("데이터 디렉토리 생성 실패: {}", parent.display()))?;
        }
    }

    let store = SqliteKvStore::open(&db_path)
        .with_context(|| format!("SQLite 저장소 열기 실패: {}", db_path.display()))?;
    info!("SQLite 저장소: {}", db_path.display());
    Ok((Arc::new(store), db_path.display().to_string()))
}

/// 쿠키 확인용 브라우저 표면
pub fn browser(options: &WiringOptions) -> Arc<dyn BrowserSurface> {
    if options.no_browser {
        Arc::new(HeadlessBrowser)
    } else {
        Arc::new(SystemBrowser::new())
    }
}

/// 전체 조립
pub fn build(options: &WiringOptions) -> Result<App> {
    let config_manager = load_config(options)?;
    let config = config_manager.get();
    let (store, store_location) = open_store(options, &config)?;

    let service = SessionService::new(store, Arc::new(SystemClock), browser(options), config);

    Ok(App {
        service,
        config_manager,
        store_location,
    })
}
