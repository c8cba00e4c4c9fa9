//! Per-driver append-only lap ledger
//!
//! New-lap detection is an explicit membership check against the lap numbers
//! already committed, never structural comparison of lap values. Detection
//! and commit are separate steps so the roster can validate a whole payload
//! before touching any ledger.

use std::collections::HashSet;
use tracing::debug;

use crate::feed::LapUpdate;
use crate::types::LapRecord;

/// Append-only collection of one driver's completed laps
#[derive(Debug, Clone, Default)]
pub struct DriverLedger {
    /// Laps in commit order
    laps: Vec<LapRecord>,

    /// Every lap number ever committed
    seen: HashSet<u32>,
}

impl DriverLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Laps in `update` whose numbers have not been committed yet.
    ///
    /// A number repeated inside one update is reported once, first
    /// occurrence wins. Does not modify the ledger.
    pub fn detect_new(&self, update: &LapUpdate) -> Vec<LapRecord> {
        let mut in_batch = HashSet::new();
        update
            .observations()
            .iter()
            .filter(|lap| !self.seen.contains(&lap.number) && in_batch.insert(lap.number))
            .cloned()
            .collect()
    }

    /// Append laps, skipping any number already present.
    ///
    /// Returns the laps actually appended.
    pub fn commit(&mut self, laps: Vec<LapRecord>) -> Vec<LapRecord> {
        let mut appended = Vec::with_capacity(laps.len());
        for lap in laps {
            if self.seen.insert(lap.number) {
                self.laps.push(lap.clone());
                appended.push(lap);
            } else {
                debug!(lap = lap.number, "Skipping already committed lap");
            }
        }
        appended
    }

    /// All committed laps in commit order
    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    /// Highest committed lap
    pub fn latest(&self) -> Option<&LapRecord> {
        self.laps.iter().max_by_key(|lap| lap.number)
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }
}
