//! CLI 명령 처리.
//!
//! 각 명령은 세션 서비스를 한 번 실행하고 결과를 텍스트 또는 JSON으로 출력한다.
//! status/suggest/export/diagnose는 읽기 전용이다. 메모리 상태가 필요한 명령은
//! 먼저 `load_all`로 상태를 적재하며, 이때 무효 레코드가 정리된다.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use reelgate_core::models::health::{format_duration, LoginExport};
use reelgate_core::models::platform::Platform;
use reelgate_core::models::recovery::RecoveryOutcome;
use reelgate_core::models::session::LoginMetadata;
use reelgate_session::detection::LoginDetector;
use reelgate_session::manager::verify_export;
use reelgate_session::service::AppState;
use reelgate_session::validator::InvalidReason;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{info, warn};

use crate::event_bus::{log_events, EventBus, SessionEvent};
use crate::lifecycle::LifecycleManager;
use crate::wiring::App;
use crate::Command;

/// 결과 출력 (JSON 또는 사람이 읽는 텍스트)
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "❌"
    }
}

/// `status` 출력 행
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRow {
    platform: Platform,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<InvalidReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    login_method: Option<String>,
}

#[derive(Debug, Serialize)]
struct ActionResult {
    platform: Option<Platform>,
    action: &'static str,
    ok: bool,
}

pub async fn execute(command: Command, app: &App, json: bool) -> Result<()> {
    let service = &app.service;
    let manager = service.manager();

    match command {
        Command::Status => {
            let rows: Vec<StatusRow> = manager
                .check_all()
                .await
                .into_values()
                .map(|check| StatusRow {
                    platform: check.platform,
                    valid: check.is_valid(),
                    reason: check.verdict.reason(),
                    session_id: check.record.as_ref().map(|r| r.session_id.clone()),
                    login_method: check.record.map(|r| r.metadata.login_method),
                })
                .collect();
            emit(json, &rows, || {
                let mut out = String::new();
                for row in &rows {
                    let _ = writeln!(
                        out,
                        "{} {:<10} {}",
                        mark(row.valid),
                        row.platform.display_name(),
                        row.reason
                            .map(|r| format!("{r:?}"))
                            .unwrap_or_else(|| "유효".to_string())
                    );
                }
                out
            })?;
        }

        Command::Login {
            platform,
            method,
            user_agent,
        } => {
            let mut metadata = LoginMetadata::method(method);
            if let Some(ua) = user_agent {
                metadata = metadata.with_user_agent(ua);
            }
            manager.set_login_status(platform, true, metadata).await?;
            let record = manager
                .get_record(platform)
                .await
                .ok_or_else(|| anyhow!("{platform} 세션 레코드를 다시 읽지 못했습니다"))?;
            emit(json, &record, || {
                format!(
                    "✅ {} 로그인 기록 (session_id={})\n",
                    platform.display_name(),
                    record.session_id
                )
            })?;
        }

        Command::Logout { platform, all } => {
            if all {
                manager.logout_all().await?;
            } else {
                let platform = platform.ok_or_else(|| anyhow!("플랫폼 또는 --all 필요"))?;
                manager.logout(platform).await?;
            }
            let result = ActionResult {
                platform: if all { None } else { platform },
                action: "logout",
                ok: true,
            };
            emit(json, &result, || match result.platform {
                Some(p) => format!("👋 {} 로그아웃\n", p.display_name()),
                None => "👋 전체 로그아웃\n".to_string(),
            })?;
        }

        Command::Renew { platform } => {
            let renewed = manager.renew_session(platform).await?;
            let result = ActionResult {
                platform: Some(platform),
                action: "renew",
                ok: renewed,
            };
            emit(json, &result, || {
                if renewed {
                    format!("🔄 {} 세션 갱신\n", platform.display_name())
                } else {
                    format!("⚠️  {}: 갱신할 세션 없음\n", platform.display_name())
                }
            })?;
        }

        Command::Touch { platform } => {
            let touched = manager.update_activity(platform).await?;
            let result = ActionResult {
                platform: Some(platform),
                action: "touch",
                ok: touched,
            };
            emit(json, &result, || {
                format!("{} {} 활동 시각\n", mark(touched), platform.display_name())
            })?;
        }

        Command::Refresh => {
            manager.load_all().await;
            let results = manager.refresh_all_sessions().await;
            emit(json, &results, || render_bool_map(&results, "갱신된 세션 없음"))?;
        }

        Command::Recover { platform } => {
            let recovery = service.recovery();
            let report: BTreeMap<Platform, RecoveryOutcome> = match platform {
                Some(p) => BTreeMap::from([(p, recovery.recover_platform_session(p).await)]),
                None => recovery
                    .attempt_auto_recovery()
                    .await
                    .ok_or_else(|| anyhow!("자동 복구가 이미 진행 중입니다"))?,
            };
            manager.load_all().await;
            emit(json, &report, || {
                let mut out = String::new();
                for (p, outcome) in &report {
                    let _ = writeln!(
                        out,
                        "{} {:<10} {:?} → {:?}{}",
                        mark(outcome.status.is_recovered()),
                        p.display_name(),
                        outcome.status,
                        outcome.action,
                        outcome
                            .attempts
                            .map(|a| format!(" (시도 {a})"))
                            .unwrap_or_default()
                    );
                }
                out
            })?;
        }

        Command::Health => {
            manager.load_all().await;
            let health = manager.session_health().await;
            emit(json, &health, || {
                let mut out = format!("상태: {:?}\n", health.overall);
                for issue in &health.issues {
                    let _ = writeln!(out, "  ⚠️  {issue}");
                }
                for rec in &health.recommendations {
                    let _ = writeln!(out, "  💡 {rec}");
                }
                out
            })?;
        }

        Command::Stats => {
            manager.load_all().await;
            let stats = manager.login_stats().await;
            emit(json, &stats, || {
                let mut out = format!(
                    "로그인 {}/{} (확인 {})\n",
                    stats.total_logged_in,
                    Platform::ALL.len(),
                    stats.last_checked.format("%Y-%m-%d %H:%M:%S UTC")
                );
                for s in stats.platforms.values() {
                    if s.login_time.is_none() {
                        let _ = writeln!(out, "  {:<10} -", s.platform.display_name());
                        continue;
                    }
                    let _ = writeln!(
                        out,
                        "  {:<10} 나이 {} / 만료까지 {} / 방식 {}",
                        s.platform.display_name(),
                        format_duration(s.session_age()),
                        format_duration(s.time_to_expiry()),
                        s.login_method.as_deref().unwrap_or("-")
                    );
                }
                out
            })?;
        }

        Command::Backup => {
            let snapshot = service.backup().create_session_backup().await?;
            emit(json, &snapshot, || {
                format!("💾 세션 백업 {}개 저장\n", snapshot.sessions.len())
            })?;
        }

        Command::Restore => {
            manager.load_all().await;
            let report = service.backup().restore_session_backup().await?;
            emit(json, &report, || match &report {
                None => "복원할 백업 없음 (없거나 오래됨)\n".to_string(),
                Some(report) => {
                    let mut out = String::new();
                    for (p, result) in report {
                        let _ = writeln!(out, "  {:<10} {:?}", p.display_name(), result);
                    }
                    out
                }
            })?;
        }

        Command::Export { output } => {
            let export = manager.export_login_data().await?;
            let raw = serde_json::to_string_pretty(&export)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &raw)
                        .with_context(|| format!("내보내기 파일 저장 실패: {}", path.display()))?;
                    info!(path = %path.display(), "로그인 데이터 내보내기");
                    if !json {
                        println!("📦 {} ({}개 로그인)", path.display(), export.total_logins);
                    }
                }
                None => println!("{raw}"),
            }
        }

        Command::Verify { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("파일 읽기 실패: {}", file.display()))?;
            let export: LoginExport = serde_json::from_str(&raw)
                .with_context(|| format!("내보내기 형식이 아닙니다: {}", file.display()))?;
            let ok = verify_export(&export);
            emit(json, &ok, || format!("{} 체크섬 검증\n", mark(ok)))?;
            if !ok {
                bail!("체크섬 불일치: {}", file.display());
            }
        }

        Command::Suggest => {
            let suggestions = manager.login_suggestions().await;
            emit(json, &suggestions, || {
                let mut out = String::new();
                for s in &suggestions {
                    let _ = writeln!(
                        out,
                        "  [{:?}] {:<10} {}",
                        s.priority,
                        s.platform.display_name(),
                        s.reason
                    );
                }
                if out.is_empty() {
                    out.push_str("모든 플랫폼 로그인됨\n");
                }
                out
            })?;
        }

        Command::Detect {
            platform,
            url,
            apply,
        } => {
            let detector = LoginDetector::new(platform);
            let step = detector.classify(&url);
            let signal = detector.detect(&url);
            let detected = signal.is_some();

            if let (true, Some(signal)) = (apply, signal) {
                manager
                    .set_login_status(platform, true, signal.into_metadata())
                    .await?;
            }

            #[derive(Serialize)]
            struct Detection {
                platform: Platform,
                step: Option<reelgate_session::detection::LoginStep>,
                detected: bool,
                applied: bool,
            }
            let result = Detection {
                platform,
                step,
                detected,
                applied: apply && detected,
            };
            emit(json, &result, || {
                format!(
                    "{} {} 로그인 감지 (단계: {:?}){}\n",
                    mark(detected),
                    platform.display_name(),
                    step,
                    if result.applied { " — 기록됨" } else { "" }
                )
            })?;
        }

        Command::Diagnose => {
            let diagnostics = manager.diagnostics().await?;
            emit(json, &diagnostics, || {
                let mut out = format!(
                    "관리 키 {}개, 총 {} bytes\n",
                    diagnostics.managed_keys.len(),
                    diagnostics.total_bytes
                );
                for key in &diagnostics.managed_keys {
                    let _ = writeln!(out, "  {key}");
                }
                out
            })?;
        }

        Command::Config => {
            let config = app.config_manager.get();
            emit(json, &config, || {
                format!(
                    "설정 파일: {}\n{}\n",
                    app.config_manager.config_path().display(),
                    serde_json::to_string_pretty(&config).unwrap_or_default()
                )
            })?;
        }

        Command::Run => run(app, json).await?,
    }

    manager.cleanup();
    Ok(())
}

fn render_bool_map(map: &BTreeMap<Platform, bool>, empty: &str) -> String {
    if map.is_empty() {
        return format!("{empty}\n");
    }
    let mut out = String::new();
    for (p, ok) in map {
        let _ = writeln!(out, "{} {}", mark(*ok), p.display_name());
    }
    out
}

/// 상주 실행 — 실행 순서, 모니터, 시그널 대기, 종료 처리
async fn run(app: &App, json: bool) -> Result<()> {
    let service = &app.service;
    let lifecycle = LifecycleManager::new();
    let bus = EventBus::default();

    let logger = tokio::spawn(log_events(bus.subscribe()));
    let subscription = bus.bridge_manager(service.manager());

    let report = service.initialize().await;
    service.start_monitor(Some(bus.health_observer()));
    bus.publish(SessionEvent::AppStateChanged(AppState::Active));

    emit(json, &report.states, || {
        let mut out = String::from("🚀 Reelgate 세션 서비스 실행 중 (Ctrl+C로 종료)\n");
        for (p, logged_in) in report.states.iter() {
            let _ = writeln!(out, "  {} {}", mark(logged_in), p.display_name());
        }
        out
    })?;
    if let Some(recovery) = &report.recovery {
        for (p, outcome) in recovery {
            if outcome.status.is_recovered() {
                info!(platform = %p, status = ?outcome.status, "실행 시 세션 복구");
            }
        }
    }

    let started = Utc::now();
    let cause = lifecycle.wait_for_signal().await?;
    info!(%cause, "종료 시작");

    bus.publish(SessionEvent::AppStateChanged(AppState::Inactive));
    if let Err(e) = service.shutdown().await {
        warn!("종료 처리 중 에러: {e}");
    }
    subscription.unsubscribe();
    drop(bus);
    let _ = logger.await;

    info!(
        uptime = %format_duration(Utc::now() - started),
        "Reelgate 종료"
    );
    Ok(())
}
