//! 시계 포트.
//!
//! 세션 검증과 복구 윈도우는 모두 주입된 시계를 기준으로 한다.
//! 테스트는 `ManualClock`으로 시간을 직접 움직인다.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// 현재 시각 제공자
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동 시계 (테스트/시뮬레이션용)
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// 시각 지정
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    /// 시간 전진
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
