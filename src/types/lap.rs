//! Completed lap observations

use serde::{Deserialize, Serialize};
use std::fmt;

/// One completed lap by one driver.
///
/// Immutable once built. Within a driver's ledger a lap is identified by
/// `number` alone; `time` and `position` are whatever the provider reported
/// the first time that number was seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LapRecord {
    /// Lap number (running lap count for single-observation feeds)
    pub number: u32,
    /// Lap time exactly as the provider formats it, empty when unreported
    pub time: String,
    /// Running position at the end of the lap
    pub position: u32,
}

impl LapRecord {
    /// Create a new lap record
    pub fn new(number: u32, time: impl Into<String>, position: u32) -> Self {
        Self { number, time: time.into(), position }
    }
}

impl fmt::Display for LapRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lap number: {}, Lap time: {}, Driver position: {}",
            self.number, self.time, self.position
        )
    }
}
