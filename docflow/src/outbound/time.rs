//! The [TimeGetter] implementation suitable for everything but tests.

use crate::domain::ports::TimeGetter;
use chrono::Utc;

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl TimeGetter for WallClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        Utc::now()
    }
}
