//! # reelgate-app
//!
//! Reelgate 바이너리 진입점.
//! DI 와이어링, 세션 서비스 실행 순서, 라이프사이클, CLI 명령.

mod commands;
mod event_bus;
mod lifecycle;
mod system_browser;
mod wiring;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reelgate_core::models::platform::Platform;
use reelgate_core::models::session::DEFAULT_LOGIN_METHOD;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Reelgate 세션 관리 도구
///
/// YouTube/TikTok/Instagram 임베드 웹뷰의 로그인 세션 검증, 복구, 백업
#[derive(Parser, Debug)]
#[command(name = "reelgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    /// 데이터 저장 경로 (기본: 플랫폼별 데이터 디렉토리)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// 설정 파일 경로 (기본: 플랫폼별 설정 디렉토리의 config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 인메모리 저장소 사용 (프로세스 종료 시 소멸)
    #[arg(long, global = true)]
    ephemeral: bool,

    /// 쿠키 확인 경로에서 브라우저를 열지 않음
    #[arg(long, global = true)]
    no_browser: bool,

    /// JSON으로 출력
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 플랫폼별 세션 검증 결과 (읽기 전용)
    Status,
    /// 로그인 기록
    Login {
        platform: Platform,
        /// 로그인 방식
        #[arg(long, default_value = DEFAULT_LOGIN_METHOD)]
        method: String,
        /// 웹뷰 User-Agent
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// 로그아웃
    Logout {
        #[arg(required_unless_present = "all")]
        platform: Option<Platform>,
        /// 모든 플랫폼 로그아웃
        #[arg(long, conflicts_with = "platform")]
        all: bool,
    },
    /// 세션 갱신
    Renew { platform: Platform },
    /// 활동 시각 갱신
    Touch { platform: Platform },
    /// 로그인된 모든 세션 갱신
    Refresh,
    /// 무효 세션 자동 복구 (플랫폼 생략 시 전체)
    Recover { platform: Option<Platform> },
    /// 세션 건강 리포트
    Health,
    /// 로그인 통계
    Stats,
    /// 유효 세션 백업
    Backup,
    /// 백업 복원
    Restore,
    /// 비민감 로그인 데이터 내보내기
    Export {
        /// 출력 파일 (생략 시 표준 출력)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// 내보낸 파일의 체크섬 검증
    Verify { file: PathBuf },
    /// 로그인 제안
    Suggest,
    /// 웹뷰 URL로 로그인 완료 감지
    Detect {
        platform: Platform,
        url: String,
        /// 감지되면 로그인으로 기록
        #[arg(long)]
        apply: bool,
    },
    /// 저장소/타이머 진단
    Diagnose,
    /// 적용된 설정 출력
    Config,
    /// 실행 순서 수행 후 백그라운드 모니터 실행 (시그널까지)
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "reelgate={level},reelgate_app={level},reelgate_core={level},reelgate_storage={level},reelgate_session={level}",
        level = args.log_level
    );
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let options = wiring::WiringOptions {
        data_dir: args.data_dir,
        config_path: args.config,
        ephemeral: args.ephemeral,
        no_browser: args.no_browser,
    };
    let app = wiring::build(&options)?;
    info!(
        config = %app.config_manager.config_path().display(),
        store = %app.store_location,
        "Reelgate 초기화"
    );

    commands::execute(args.command, &app, args.json).await
}
