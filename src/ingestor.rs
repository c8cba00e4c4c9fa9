//! Ingestion loop
//!
//! One cycle is fetch, ingest, project, flush. Cycles never overlap: the
//! loop sleeps a fixed delay after each cycle's work finishes, so a slow
//! fetch or write pushes the next poll later.
//!
//! ```text
//!            new laps              flushed
//! POLLING ─────────────▶ FLUSHING ─────────▶ POLLING
//!    │                      │
//!    └──── error ───────────┴──────────────▶ FAILED (terminal)
//! ```

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::feed::Payload;
use crate::projection::{FlatRow, flatten, pivot};
use crate::roster::{DriverLaps, Roster};
use crate::sink::{LapSink, Projection};
use crate::source::TimingSource;
use crate::{LapFeedError, Result};

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    /// Waiting for or processing a fetch
    Polling,

    /// Writing new laps to the sink
    Flushing,

    /// Stopped after an unrecoverable error
    Failed,
}

/// Summary of one completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle counter
    pub cycle: u64,

    /// Laps committed this cycle across all drivers
    pub new_laps: usize,

    /// Drivers with at least one new lap
    pub drivers_with_new_laps: usize,

    /// Data rows handed to the sink, zero when nothing was flushed
    pub rows_written: usize,

    /// Whether the sink was written this cycle
    pub flushed: bool,
}

/// Owns the roster and drives it from a source into a sink
pub struct Ingestor<S, K> {
    source: S,
    sink: K,
    roster: Roster,
    interval: Duration,
    /// Bootstrap payload, consumed by the first cycle instead of a fetch
    pending: Option<Payload>,
    state: IngestState,
    cycles: u64,
}

impl<S, K> Ingestor<S, K>
where
    S: TimingSource,
    K: LapSink,
{
    /// Fetch the initial payload and build the roster from it.
    ///
    /// The same payload is ingested again by the first cycle, so laps it
    /// already carries are flushed.
    pub async fn bootstrap(mut source: S, sink: K, interval: Duration) -> Result<Self> {
        let description = source.describe();
        info!(source = %description, mode = %sink.mode(), "Bootstrapping roster");

        let payload = source.fetch().await?.ok_or_else(|| {
            LapFeedError::fetch_failed(&description, "source ended before the first payload")
        })?;
        let roster = Roster::build(&payload)?;
        if roster.is_empty() {
            warn!(source = %description, "Initial payload lists no drivers");
        }
        info!(drivers = roster.len(), "Roster built");

        Ok(Self {
            source,
            sink,
            roster,
            interval,
            pending: Some(payload),
            state: IngestState::Polling,
            cycles: 0,
        })
    }

    /// Seed ledgers from rows written by an earlier run
    pub fn resume(&mut self, rows: &[FlatRow]) -> usize {
        let restored = self.roster.resume(rows);
        if restored > 0 {
            info!(laps = restored, "Restored laps from previous output");
        }
        restored
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    /// Run one cycle.
    ///
    /// Returns `Ok(None)` when the source is exhausted. Any error moves the
    /// loop to [`IngestState::Failed`] and every later call returns an error.
    pub async fn poll_once(&mut self) -> Result<Option<CycleReport>> {
        if self.state == IngestState::Failed {
            return Err(LapFeedError::Halted { cycle: self.cycles });
        }

        match self.cycle().await {
            Ok(report) => {
                self.state = IngestState::Polling;
                Ok(report)
            }
            Err(e) => {
                self.state = IngestState::Failed;
                error!(cycle = self.cycles, error = %e, "Ingestion failed");
                Err(e)
            }
        }
    }

    /// Poll until the source is exhausted or a cycle fails
    pub async fn run(&mut self) -> Result<()> {
        info!(
            source = %self.source.describe(),
            interval_ms = self.interval.as_millis() as u64,
            "Ingestion started"
        );

        while let Some(report) = self.poll_once().await? {
            debug!(
                cycle = report.cycle,
                new_laps = report.new_laps,
                rows = report.rows_written,
                "Cycle complete"
            );
            tokio::time::sleep(self.interval).await;
        }

        info!(cycles = self.cycles, laps = self.roster.total_laps(), "Source exhausted");
        Ok(())
    }

    async fn cycle(&mut self) -> Result<Option<CycleReport>> {
        self.state = IngestState::Polling;
        let payload = match self.pending.take() {
            Some(payload) => payload,
            None => match self.source.fetch().await? {
                Some(payload) => payload,
                None => return Ok(None),
            },
        };
        self.cycles += 1;

        let pairs = self.roster.ingest(&payload)?;
        let new_laps: usize = pairs.iter().map(|pair| pair.laps.len()).sum();
        let drivers_with_new_laps = pairs.iter().filter(|pair| !pair.laps.is_empty()).count();

        if new_laps == 0 {
            debug!(cycle = self.cycles, "No new laps");
            return Ok(Some(CycleReport {
                cycle: self.cycles,
                new_laps,
                drivers_with_new_laps,
                rows_written: 0,
                flushed: false,
            }));
        }

        self.state = IngestState::Flushing;
        let projection = self.project(&pairs);
        self.sink.write(&projection)?;
        info!(
            cycle = self.cycles,
            new_laps,
            drivers = drivers_with_new_laps,
            rows = projection.row_count(),
            "Flushed laps"
        );

        Ok(Some(CycleReport {
            cycle: self.cycles,
            new_laps,
            drivers_with_new_laps,
            rows_written: projection.row_count(),
            flushed: true,
        }))
    }

    fn project(&self, pairs: &[DriverLaps]) -> Projection {
        if self.sink.mode().needs_history() {
            Projection::Table(pivot(&flatten(&self.roster.history())))
        } else {
            Projection::Rows(flatten(pairs))
        }
    }
}
