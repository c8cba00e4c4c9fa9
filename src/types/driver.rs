//! Driver identity as established at roster construction

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable driver key assigned by the timing provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DriverId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DriverId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Descriptive driver fields. Never changes after the roster is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Provider driver key
    pub id: DriverId,
    /// Car number as displayed
    pub car_number: String,
    /// Display name; used as the column key in pivoted output
    pub name: String,
    /// Manufacturer (or team, for feeds that do not report one)
    pub manufacturer: String,
}
