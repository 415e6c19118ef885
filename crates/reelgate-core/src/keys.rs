//! 영속 상태 키 레이아웃.
//!
//! - `login_<platform>` → 세션 레코드 JSON
//! - `recovery_attempts_<platform>` → 복구 카운터 JSON
//! - `session_backup` → 백업 스냅샷 JSON

use crate::models::platform::Platform;

const LOGIN_PREFIX: &str = "login_";
const RECOVERY_PREFIX: &str = "recovery_attempts_";

/// 백업 스냅샷 키
pub const SESSION_BACKUP: &str = "session_backup";

/// 세션 레코드 키
pub fn login(platform: Platform) -> String {
    format!("{LOGIN_PREFIX}{platform}")
}

/// 복구 카운터 키
pub fn recovery_attempts(platform: Platform) -> String {
    format!("{RECOVERY_PREFIX}{platform}")
}

/// 세션 코어가 관리하는 키인지
pub fn is_managed(key: &str) -> bool {
    key == SESSION_BACKUP
        || Platform::ALL
            .iter()
            .any(|p| key == login(*p) || key == recovery_attempts(*p))
}
