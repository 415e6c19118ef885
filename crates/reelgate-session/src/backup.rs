//! 세션 백업/복원.
//!
//! 유효한 세션의 비민감 필드를 `session_backup` 키에 스냅샷으로 저장하고,
//! 다음 실행 시 로그인되지 않은 플랫폼만 채워 넣는다.
//! 복원은 현재 유효한 세션을 절대 덮어쓰지 않는다. 확인과 쓰기는 관리자의 플랫폼 잠금 안에서 함께 일어난다.

use chrono::Duration;
use reelgate_core::config::BackupConfig;
use reelgate_core::error::CoreError;
use reelgate_core::keys;
use reelgate_core::models::backup::{
    BackupEntry, RestoreReport, RestoreResult, SessionBackupSnapshot,
};
use reelgate_core::models::session::LoginMetadata;
use tracing::{debug, info, warn};

use crate::manager::SessionManager;

/// 복원된 세션의 로그인 방식
pub const RESTORE_LOGIN_METHOD: &str = "backup_restore";

/// 백업 서비스
#[derive(Clone)]
pub struct BackupService {
    manager: SessionManager,
    max_age: Duration,
}

impl BackupService {
    pub fn new(manager: SessionManager, config: &BackupConfig) -> Self {
        Self {
            manager,
            max_age: Duration::days(i64::from(config.max_age_days)),
        }
    }

    /// 유효한 세션 스냅샷 저장 (기존 스냅샷 교체)
    pub async fn create_session_backup(&self) -> Result<SessionBackupSnapshot, CoreError> {
        let mut snapshot = SessionBackupSnapshot::new(self.manager.clock().now());

        for check in self.manager.check_all().await.into_values() {
            if let (true, Some(record)) = (check.is_valid(), check.record.as_ref()) {
                snapshot
                    .sessions
                    .insert(check.platform, BackupEntry::from(record));
            }
        }

        let raw = serde_json::to_string(&snapshot)?;
        self.manager
            .store()
            .set(keys::SESSION_BACKUP, &raw)
            .await
            .inspect_err(|e| warn!("세션 백업 저장 실패: {e}"))?;

        info!(sessions = snapshot.sessions.len(), "세션 백업 생성");
        Ok(snapshot)
    }

    /// 저장된 스냅샷 (없거나 해석 불가면 None)
    pub async fn load_snapshot(&self) -> Result<Option<SessionBackupSnapshot>, CoreError> {
        let Some(raw) = self.manager.store().get(keys::SESSION_BACKUP).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("세션 백업 해석 실패 — 무시: {e}");
                Ok(None)
            }
        }
    }

    /// 스냅샷 복원
    ///
    /// 스냅샷이 없거나 오래됐으면 `Ok(None)`. 유효한 현재 세션은 건너뛴다.
    pub async fn restore_session_backup(&self) -> Result<Option<RestoreReport>, CoreError> {
        let Some(snapshot) = self.load_snapshot().await? else {
            debug!("복원할 세션 백업 없음");
            return Ok(None);
        };

        let now = self.manager.clock().now();
        if snapshot.is_stale(now, self.max_age) {
            info!(
                backup_age_days = (now - snapshot.timestamp).num_days(),
                "세션 백업이 오래되어 무시"
            );
            return Ok(None);
        }

        let mut report = RestoreReport::new();
        for (platform, entry) in snapshot.sessions {
            if !entry.is_logged_in {
                continue;
            }

            let metadata = LoginMetadata::method(RESTORE_LOGIN_METHOD)
                .with("originalLoginTime", entry.login_time.to_rfc3339())
                .with("originalSessionId", entry.session_id)
                .with("restoredAt", now.to_rfc3339());

            let result = match self.manager.restore_login(platform, metadata).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(%platform, "세션 복원 실패: {e}");
                    RestoreResult::Failed
                }
            };
            report.insert(platform, result);
        }

        info!(?report, "세션 백업 복원 완료");
        Ok(Some(report))
    }
}
