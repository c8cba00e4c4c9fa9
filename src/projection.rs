//! Lap table projection
//!
//! Pure transformations from `(driver, laps)` pairs to output-ready tables:
//!
//! ```text
//! [(driver, [lap, ..]), ..]
//!        │ flatten
//!        ▼
//! [FlatRow { name, lap_number, position, lap_time }, ..]   sorted by (name, lap)
//!        │ pivot
//!        ▼
//! LapTable                 "Lap Time"          "Running Position"
//!   lap │ A      B         lap │ A  B
//!   ────┼──────────        ────┼──────
//!    1  │ 1:00   1:05       1  │ 1  2
//! ```
//!
//! Flattened rows are sorted so the output is byte-identical for identical
//! input sets, whatever order the roster or the payload yielded them in.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use crate::roster::DriverLaps;

/// Column headers of the flat record stream, in order
pub const FLAT_COLUMNS: [&str; 4] = ["Name", "Lap Number", "Running Position", "Lap Time"];

/// One lap as a flat record.
///
/// Field order matters: the derived `Ord` sorts by name, then lap number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlatRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Lap Number")]
    pub lap_number: u32,
    #[serde(rename = "Running Position")]
    pub position: u32,
    #[serde(rename = "Lap Time")]
    pub lap_time: String,
}

impl FlatRow {
    pub fn new(
        name: impl Into<String>,
        lap_number: u32,
        position: u32,
        lap_time: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), lap_number, position, lap_time: lap_time.into() }
    }
}

/// Flatten driver/lap pairs into rows sorted by `(name, lap_number)`
pub fn flatten(pairs: &[DriverLaps]) -> Vec<FlatRow> {
    let mut rows: Vec<FlatRow> = pairs
        .iter()
        .flat_map(|pair| {
            pair.laps.iter().map(|lap| FlatRow {
                name: pair.driver.name.clone(),
                lap_number: lap.number,
                position: lap.position,
                lap_time: lap.time.clone(),
            })
        })
        .collect();
    rows.sort();
    rows
}

/// The two value groups of a pivoted table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueGroup {
    LapTime,
    RunningPosition,
}

impl ValueGroup {
    pub const ALL: [ValueGroup; 2] = [ValueGroup::LapTime, ValueGroup::RunningPosition];

    /// Sheet / section title
    pub fn title(self) -> &'static str {
        match self {
            ValueGroup::LapTime => "Lap Time",
            ValueGroup::RunningPosition => "Running Position",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    lap_time: String,
    position: u32,
}

/// Wide table indexed by lap number with one column per driver name
/// in each value group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LapTable {
    drivers: Vec<String>,
    rows: BTreeMap<u32, Vec<Option<Cell>>>,
}

impl LapTable {
    /// Driver names in column order (ascending)
    pub fn drivers(&self) -> &[String] {
        &self.drivers
    }

    /// Lap numbers in row order (ascending, unique)
    pub fn laps(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn lap_time(&self, lap: u32, driver: &str) -> Option<&str> {
        self.cell(lap, driver).map(|cell| cell.lap_time.as_str())
    }

    pub fn position(&self, lap: u32, driver: &str) -> Option<u32> {
        self.cell(lap, driver).map(|cell| cell.position)
    }

    fn cell(&self, lap: u32, driver: &str) -> Option<&Cell> {
        let column = self.drivers.binary_search_by(|name| name.as_str().cmp(driver)).ok()?;
        self.rows.get(&lap)?.get(column)?.as_ref()
    }
}

/// Pivot flat rows into a [`LapTable`].
///
/// The lap 0 row is removed: some providers report a placeholder lap 0 with
/// no real timing. When two rows share a lap and a driver name the later
/// row wins.
pub fn pivot(rows: &[FlatRow]) -> LapTable {
    let drivers: Vec<String> =
        rows.iter().map(|row| row.name.clone()).collect::<BTreeSet<_>>().into_iter().collect();
    let columns: BTreeMap<&str, usize> =
        drivers.iter().enumerate().map(|(index, name)| (name.as_str(), index)).collect();

    let mut table_rows: BTreeMap<u32, Vec<Option<Cell>>> = BTreeMap::new();
    for row in rows {
        let column = columns[row.name.as_str()];
        let cells = table_rows.entry(row.lap_number).or_insert_with(|| vec![None; drivers.len()]);
        let cell = Cell { lap_time: row.lap_time.clone(), position: row.position };
        if cells[column].replace(cell).is_some() {
            warn!(
                driver = %row.name,
                lap = row.lap_number,
                "Two rows for the same lap and driver name"
            );
        }
    }

    table_rows.remove(&0);

    LapTable { drivers, rows: table_rows }
}
