//! Session roster
//!
//! The roster is built once from the first payload and owns every driver's
//! ledger for the rest of the process. Its key set never changes: a payload
//! entry naming a driver that was not present at construction is rejected.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::feed::{FeedEntry, Payload};
use crate::ledger::DriverLedger;
use crate::projection::FlatRow;
use crate::types::{DriverId, DriverInfo, LapRecord};
use crate::{LapFeedError, Result};

/// A driver and their ledger
#[derive(Debug, Clone)]
pub struct Driver {
    info: Arc<DriverInfo>,
    ledger: DriverLedger,
}

impl Driver {
    fn new(info: DriverInfo) -> Self {
        Self { info: Arc::new(info), ledger: DriverLedger::new() }
    }

    pub fn info(&self) -> &Arc<DriverInfo> {
        &self.info
    }

    pub fn ledger(&self) -> &DriverLedger {
        &self.ledger
    }
}

/// A driver paired with a set of their laps
#[derive(Debug, Clone, PartialEq)]
pub struct DriverLaps {
    pub driver: Arc<DriverInfo>,
    pub laps: Vec<LapRecord>,
}

/// Fixed set of drivers for one session
#[derive(Debug, Clone, Default)]
pub struct Roster {
    drivers: BTreeMap<DriverId, Driver>,
}

impl Roster {
    /// Build a roster with empty ledgers from the initial payload.
    ///
    /// Every entry must carry a driver id, car number, name and
    /// manufacturer. When an id appears twice the first entry wins.
    pub fn build(payload: &Payload) -> Result<Self> {
        let mut drivers = BTreeMap::new();

        for (index, entry) in payload.entries.iter().enumerate() {
            let info = driver_info(index, entry)?;
            if drivers.contains_key(&info.id) {
                warn!(
                    driver_id = %info.id,
                    entry = index,
                    "Duplicate driver id in initial payload"
                );
                continue;
            }
            debug!(
                driver_id = %info.id,
                name = %info.name,
                car = %info.car_number,
                "Registered driver"
            );
            drivers.insert(info.id.clone(), Driver::new(info));
        }

        Ok(Self { drivers })
    }

    /// Apply one poll's payload.
    ///
    /// Returns one [`DriverLaps`] per payload entry, in payload order,
    /// including entries with no new laps. Every entry is resolved before
    /// any ledger is touched, so a failed ingest leaves the roster unchanged.
    pub fn ingest(&mut self, payload: &Payload) -> Result<Vec<DriverLaps>> {
        let mut detected = Vec::with_capacity(payload.entries.len());

        for (index, entry) in payload.entries.iter().enumerate() {
            let id = entry.driver_id.as_ref().ok_or_else(|| {
                LapFeedError::parse_error(format!("payload entry {index}"), "missing driver id")
            })?;
            let driver =
                self.drivers.get(id).ok_or_else(|| LapFeedError::unknown_driver(id.as_str()))?;
            detected.push((id, driver.ledger.detect_new(&entry.update)));
        }

        let mut results = Vec::with_capacity(detected.len());
        for (id, new_laps) in detected {
            let Some(driver) = self.drivers.get_mut(id) else {
                return Err(LapFeedError::unknown_driver(id.as_str()));
            };
            let appended = driver.ledger.commit(new_laps);
            for lap in &appended {
                info!(
                    driver = %driver.info.name,
                    lap = lap.number,
                    time = %lap.time,
                    position = lap.position,
                    "New lap"
                );
            }
            results.push(DriverLaps { driver: Arc::clone(&driver.info), laps: appended });
        }

        Ok(results)
    }

    /// Every driver with their full accumulated history, in id order
    pub fn history(&self) -> Vec<DriverLaps> {
        self.drivers
            .values()
            .map(|driver| DriverLaps {
                driver: Arc::clone(&driver.info),
                laps: driver.ledger.laps().to_vec(),
            })
            .collect()
    }

    /// Seed ledgers from previously written flat rows, matched by driver name.
    ///
    /// Returns the number of laps committed. Rows for names not on the
    /// roster are skipped.
    pub fn resume(&mut self, rows: &[FlatRow]) -> usize {
        let by_name: HashMap<String, DriverId> = self
            .drivers
            .values()
            .map(|driver| (driver.info.name.clone(), driver.info.id.clone()))
            .collect();

        let mut grouped: BTreeMap<&DriverId, Vec<LapRecord>> = BTreeMap::new();
        let mut unmatched: BTreeMap<&str, usize> = BTreeMap::new();
        for row in rows {
            match by_name.get(&row.name) {
                Some(id) => grouped.entry(id).or_default().push(LapRecord::new(
                    row.lap_number,
                    row.lap_time.clone(),
                    row.position,
                )),
                None => *unmatched.entry(row.name.as_str()).or_default() += 1,
            }
        }

        for (name, count) in unmatched {
            warn!(driver = name, rows = count, "Recorded laps for driver not on roster");
        }

        let mut committed = 0;
        for (id, laps) in grouped {
            if let Some(driver) = self.drivers.get_mut(id) {
                committed += driver.ledger.commit(laps).len();
            }
        }
        committed
    }

    pub fn get(&self, id: &str) -> Option<&Driver> {
        self.drivers.get(id)
    }

    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Total committed laps across all drivers
    pub fn total_laps(&self) -> usize {
        self.drivers.values().map(|driver| driver.ledger.len()).sum()
    }
}

fn driver_info(index: usize, entry: &FeedEntry) -> Result<DriverInfo> {
    let required = |value: &Option<String>, field: &str| {
        value.clone().ok_or_else(|| LapFeedError::malformed_payload(index, field))
    };
    let id = entry
        .driver_id
        .clone()
        .ok_or_else(|| LapFeedError::malformed_payload(index, "driver id"))?;

    Ok(DriverInfo {
        id,
        car_number: required(&entry.car_number, "car number")?,
        name: required(&entry.name, "name")?,
        manufacturer: required(&entry.manufacturer, "manufacturer")?,
    })
}
