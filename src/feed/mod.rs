//! # Timing Feed Payloads
//!
//! Each supported timing provider serves a differently shaped JSON document.
//! This module decodes both into one canonical [`Payload`] before any dedup
//! logic runs, so the ledger and roster never look at provider fields.
//!
//! ## Supported Shapes
//!
//! ```text
//! IndyCar (single running total per driver)
//!   jsonCallback({ "timing_results": { "Item": [
//!     { "DriverID": "..", "laps": "12", "lastLapTime": "..", "overallRank": "3", ... }
//!   ] } });
//!
//! NASCAR (batch of individual laps per driver)
//!   { "laps": [
//!     { "NASCARDriverID": .., "Laps": [ { "Lap": 1, "LapTime": 31.2, "RunningPos": 4 } ] }
//!   ] }
//! ```
//!
//! Both become `FeedEntry { driver fields, LapUpdate }` where [`LapUpdate`]
//! is tagged with the shape it came from.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{DriverId, LapRecord};

pub mod indycar;
pub mod nascar;
mod scalar;

pub(crate) use scalar::{Scalar, lap_time_text, non_blank_text, present_text};

/// Which provider document shape to decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// Callback-wrapped JSON reporting the latest lap per driver
    #[default]
    IndyCar,

    /// Plain JSON listing every lap per driver
    Nascar,
}

impl FeedFormat {
    /// Decode a raw response body into a canonical payload
    pub fn decode(self, body: &str) -> Result<Payload> {
        match self {
            FeedFormat::IndyCar => indycar::decode(body),
            FeedFormat::Nascar => nascar::decode(body),
        }
    }

    /// Short name used in logs and output file names
    pub fn name(self) -> &'static str {
        match self {
            FeedFormat::IndyCar => "indycar",
            FeedFormat::Nascar => "nascar",
        }
    }

    /// Public endpoint for feeds that have a well-known one
    pub fn default_endpoint(self) -> Option<&'static str> {
        match self {
            FeedFormat::IndyCar => Some(indycar::DEFAULT_ENDPOINT),
            FeedFormat::Nascar => None,
        }
    }
}

impl std::fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded poll of the timing feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub entries: Vec<FeedEntry>,
}

impl Payload {
    pub fn new(entries: Vec<FeedEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One driver's entry in a payload.
///
/// Driver fields are optional here; roster construction decides which of
/// them are required.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub driver_id: Option<DriverId>,
    pub car_number: Option<String>,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub update: LapUpdate,
}

/// Lap observations for one driver, tagged by feed shape
#[derive(Debug, Clone, PartialEq)]
pub enum LapUpdate {
    /// Only the most recent lap, keyed by the running lap count.
    /// `None` before the driver has completed a lap.
    Latest(Option<LapRecord>),

    /// Every lap the provider currently lists for the driver
    Batch(Vec<LapRecord>),
}

impl LapUpdate {
    /// All lap observations carried by this update, in provider order
    pub fn observations(&self) -> &[LapRecord] {
        match self {
            LapUpdate::Latest(Some(lap)) => std::slice::from_ref(lap),
            LapUpdate::Latest(None) => &[],
            LapUpdate::Batch(laps) => laps,
        }
    }
}
