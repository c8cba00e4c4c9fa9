//! Output sinks
//!
//! A sink receives one [`Projection`] per flush. Which projection it gets is
//! decided by the sink's [`OutputMode`], not by the ingestion loop.

use crate::Result;
use crate::projection::{FlatRow, LapTable};
use crate::types::OutputMode;

pub mod append;
pub mod workbook;

pub use append::CsvAppendSink;
pub use workbook::WorkbookSink;

/// Output of one flush
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// This cycle's new laps as flat rows (append mode)
    Rows(Vec<FlatRow>),

    /// Full accumulated history, pivoted (snapshot mode)
    Table(LapTable),
}

impl Projection {
    /// Number of data rows this projection will produce
    pub fn row_count(&self) -> usize {
        match self {
            Projection::Rows(rows) => rows.len(),
            Projection::Table(table) => table.row_count(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Projection::Rows(_) => "flat rows",
            Projection::Table(_) => "pivoted table",
        }
    }
}

/// Destination for flushed laps
pub trait LapSink: Send {
    /// Which projection this sink expects
    fn mode(&self) -> OutputMode;

    /// Write one flush. Must be durable when it returns `Ok`.
    fn write(&mut self, projection: &Projection) -> Result<()>;
}

pub(crate) fn mismatched_projection(
    path: &std::path::Path,
    mode: OutputMode,
    projection: &Projection,
) -> crate::LapFeedError {
    crate::LapFeedError::sink_error(
        path,
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{mode} sink cannot write {}", projection.kind()),
        ),
    )
}
