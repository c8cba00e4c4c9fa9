//! Incremental lap ingestion from live motorsport timing feeds.
//!
//! lapfeed polls a public timing endpoint on a fixed interval, works out
//! which completed laps it has not seen before, and writes them out as
//! spreadsheet-ready tables.
//!
//! # Features
//!
//! - **Two feed shapes**: IndyCar's callback-wrapped running total and
//!   NASCAR's per-driver lap batches, decoded into one canonical payload
//! - **Exactly-once laps**: each driver's ledger accepts a lap number once
//! - **Two output modes**: snapshot (pivoted full history, rewritten every
//!   flush) and append (flat rows, append-only log)
//!
//! # Pipeline
//!
//! ```text
//! TimingSource ──▶ Payload ──▶ Roster::ingest ──▶ flatten ──▶ LapSink
//!  (http/recorded)              (per-driver ledgers)   └─▶ pivot (snapshot)
//! ```
//!
//! ## Example (recorded bodies)
//!
//! ```rust,no_run
//! use lapfeed::feed::FeedFormat;
//! use lapfeed::sink::CsvAppendSink;
//! use lapfeed::sources::RecordedSource;
//! use lapfeed::Ingestor;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> lapfeed::Result<()> {
//!     let source = RecordedSource::open_dir("captures/", FeedFormat::Nascar)?;
//!     let sink = CsvAppendSink::open("data/nascar-replay.csv")?;
//!
//!     let mut ingestor = Ingestor::bootstrap(source, sink, Duration::ZERO).await?;
//!     ingestor.run().await?;
//!     println!("{} laps ingested", ingestor.roster().total_laps());
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
mod json_utils;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Ingestion engine
pub mod config;
pub mod feed;
pub mod ingestor;
pub mod ledger;
pub mod projection;
pub mod roster;

// Inputs and outputs
pub mod sink;
pub mod source;
pub mod sources;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use config::Settings;
pub use feed::{FeedEntry, FeedFormat, LapUpdate, Payload};
pub use ingestor::{CycleReport, IngestState, Ingestor};
pub use ledger::DriverLedger;
pub use projection::{FlatRow, LapTable, ValueGroup, flatten, pivot};
pub use roster::{Driver, DriverLaps, Roster};
pub use sink::{CsvAppendSink, LapSink, Projection, WorkbookSink};
pub use source::TimingSource;
pub use sources::{HttpSource, RecordedSource};
