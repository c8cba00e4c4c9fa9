//! Append-only flat CSV log

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{LapSink, Projection, mismatched_projection};
use crate::projection::{FLAT_COLUMNS, FlatRow};
use crate::types::OutputMode;
use crate::{LapFeedError, Result};

/// Flat `[Name, Lap Number, Running Position, Lap Time]` log.
///
/// The file stays open for the sink's lifetime so other programs can tail
/// it. The header is written only when the file starts out empty, so a
/// restarted process keeps appending to the same log.
pub struct CsvAppendSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvAppendSink {
    /// Open (or create) the log at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LapFeedError::sink_error(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LapFeedError::sink_error(&path, e))?;
        let existing_len =
            file.metadata().map_err(|e| LapFeedError::sink_error(&path, e))?.len();

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if existing_len == 0 {
            writer.write_record(FLAT_COLUMNS).map_err(|e| sink_csv_error(&path, e))?;
            writer.flush().map_err(|e| LapFeedError::sink_error(&path, e))?;
            debug!(path = %path.display(), "Wrote append log header");
        }

        info!(path = %path.display(), existing_bytes = existing_len, "Opened append log");
        Ok(Self { path, writer })
    }

    /// Read back the rows of an existing log; a missing file yields no rows
    pub fn read_existing<P: AsRef<Path>>(path: P) -> Result<Vec<FlatRow>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| sink_csv_error(path, e))?;
        reader
            .deserialize::<FlatRow>()
            .map(|row| {
                row.map_err(|e| {
                    let context = format!("append log {}", path.display());
                    LapFeedError::parse_error(context, e.to_string())
                })
            })
            .collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LapSink for CsvAppendSink {
    fn mode(&self) -> OutputMode {
        OutputMode::Append
    }

    fn write(&mut self, projection: &Projection) -> Result<()> {
        let Projection::Rows(rows) = projection else {
            return Err(mismatched_projection(&self.path, self.mode(), projection));
        };

        for row in rows {
            self.writer.serialize(row).map_err(|e| sink_csv_error(&self.path, e))?;
        }
        self.writer.flush().map_err(|e| LapFeedError::sink_error(&self.path, e))?;
        self.writer.get_ref().sync_data().map_err(|e| LapFeedError::sink_error(&self.path, e))?;

        debug!(path = %self.path.display(), rows = rows.len(), "Appended rows");
        Ok(())
    }
}

fn sink_csv_error(path: &Path, err: csv::Error) -> LapFeedError {
    LapFeedError::sink_error(path, err.into())
}
