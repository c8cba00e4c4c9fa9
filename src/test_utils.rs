//! Test utilities shared by unit tests, integration tests and benches
//!
//! Body builders produce realistic provider documents so tests exercise the
//! real decoders instead of constructing payloads by hand.

#![cfg(any(test, feature = "benchmark"))]

use serde_json::{Value, json};

use crate::feed::{FeedEntry, LapUpdate};
use crate::sink::{LapSink, Projection};
use crate::types::{DriverId, LapRecord, OutputMode};
use crate::{LapFeedError, Result};

/// Feed entry with every roster field populated
pub fn driver_entry(id: &str, name: &str, update: LapUpdate) -> FeedEntry {
    FeedEntry {
        driver_id: Some(DriverId::new(id)),
        car_number: Some(id.to_string()),
        name: Some(name.to_string()),
        manufacturer: Some("Chevrolet".to_string()),
        update,
    }
}

/// Feed entry carrying a batch of `(lap, time, position)` laps
pub fn batch_entry(id: &str, name: &str, laps: &[(u32, &str, u32)]) -> FeedEntry {
    let laps = laps
        .iter()
        .map(|&(number, time, position)| LapRecord::new(number, time, position))
        .collect();
    driver_entry(id, name, LapUpdate::Batch(laps))
}

/// NASCAR lap-times body for `(driver id, full name, laps)` entries
pub fn nascar_body(drivers: &[(&str, &str, &[(u32, &str, u32)])]) -> String {
    let entries: Vec<Value> = drivers
        .iter()
        .map(|&(id, name, laps)| {
            let laps: Vec<Value> = laps
                .iter()
                .map(|&(lap, time, position)| {
                    json!({ "Lap": lap, "LapTime": time, "RunningPos": position })
                })
                .collect();
            json!({
                "NASCARDriverID": id,
                "Number": id,
                "FullName": name,
                "Manufacturer": "Chv",
                "Laps": laps,
            })
        })
        .collect();
    json!({ "laps": entries }).to_string()
}

/// Callback-wrapped IndyCar body for
/// `(driver id, first name, last name, laps, last lap time, rank)` entries
pub fn indycar_body(drivers: &[(&str, &str, &str, &str, &str, &str)]) -> String {
    let items: Vec<Value> = drivers
        .iter()
        .map(|&(id, first, last, laps, time, rank)| {
            json!({
                "DriverID": id,
                "EntrantID": id,
                "firstName": first,
                "lastName": last,
                "team": "Chip Ganassi Racing",
                "laps": laps,
                "lastLapTime": time,
                "overallRank": rank,
            })
        })
        .collect();
    format!("jsonCallback({});", json!({ "timing_results": { "Item": items } }))
}

/// Sink keeping every projection it receives
#[derive(Debug, Clone)]
pub struct MemorySink {
    mode: OutputMode,
    pub writes: Vec<Projection>,
}

impl MemorySink {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode, writes: Vec::new() }
    }
}

impl LapSink for MemorySink {
    fn mode(&self) -> OutputMode {
        self.mode
    }

    fn write(&mut self, projection: &Projection) -> Result<()> {
        self.writes.push(projection.clone());
        Ok(())
    }
}

/// Append sink whose every write fails
#[derive(Debug, Clone, Copy)]
pub struct FailingSink;

impl LapSink for FailingSink {
    fn mode(&self) -> OutputMode {
        OutputMode::Append
    }

    fn write(&mut self, _projection: &Projection) -> Result<()> {
        Err(LapFeedError::sink_error(
            "/dev/full",
            std::io::Error::new(std::io::ErrorKind::StorageFull, "no space left on device"),
        ))
    }
}
