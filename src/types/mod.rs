//! Core value types for lap ingestion.
//!
//! - [`LapRecord`] is one completed lap by one driver
//! - [`DriverId`] and [`DriverInfo`] identify a driver for the whole session
//! - [`OutputMode`] selects how flushes reach the output sink
//!
//! ## Usage Example
//!
//! ```rust
//! use lapfeed::types::{DriverId, LapRecord};
//!
//! let id = DriverId::new("D1");
//! let lap = LapRecord::new(12, "1:00.512", 3);
//! assert_eq!(id.as_str(), "D1");
//! assert_eq!(lap.to_string(), "Lap number: 12, Lap time: 1:00.512, Driver position: 3");
//! ```

mod driver;
mod lap;
mod output_mode;

pub use driver::{DriverId, DriverInfo};
pub use lap::LapRecord;
pub use output_mode::OutputMode;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn driver_id_borrows_as_str() {
        let mut map = HashMap::new();
        map.insert(DriverId::new("4711"), "Scott Dixon");
        assert_eq!(map.get("4711"), Some(&"Scott Dixon"));
    }

    #[test]
    fn output_mode_parses_lowercase() {
        let mode: OutputMode = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(mode, OutputMode::Append);
        assert!(OutputMode::Snapshot.needs_history());
        assert!(!OutputMode::Append.needs_history());
        assert_eq!(OutputMode::default(), OutputMode::Snapshot);
    }
}
