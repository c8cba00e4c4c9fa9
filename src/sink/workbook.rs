//! Two-sheet snapshot workbook
//!
//! The pivoted table is written to `<stem>.xlsx` with one worksheet per value
//! group: "Lap Time" and "Running Position". Every flush rebuilds the whole
//! workbook and swaps it in with a rename, so a reader never sees a partial
//! file.

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use super::{LapSink, Projection, mismatched_projection};
use crate::projection::{LapTable, ValueGroup};
use crate::types::OutputMode;
use crate::{LapFeedError, Result};

/// Header of the index column in every sheet
pub const LAP_COLUMN: &str = "Lap Number";

/// Snapshot sink rewriting the full pivoted history on every flush
#[derive(Debug, Clone)]
pub struct WorkbookSink {
    directory: PathBuf,
    path: PathBuf,
}

impl WorkbookSink {
    /// Create a sink writing `<directory>/<stem>.xlsx`
    pub fn new(directory: impl Into<PathBuf>, stem: impl AsRef<str>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)
            .map_err(|e| LapFeedError::sink_error(&directory, e))?;
        let path = directory.join(format!("{}.xlsx", stem.as_ref()));
        Ok(Self { directory, path })
    }

    /// Path of the workbook
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, table: &LapTable) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        for group in ValueGroup::ALL {
            let sheet = workbook.add_worksheet();
            fill_sheet(sheet, table, group).map_err(|e| self.xlsx_error(e))?;
        }
        workbook.save_to_buffer().map_err(|e| self.xlsx_error(e))
    }

    fn xlsx_error(&self, err: XlsxError) -> LapFeedError {
        LapFeedError::sink_error(&self.path, std::io::Error::other(err))
    }
}

fn fill_sheet(
    sheet: &mut Worksheet,
    table: &LapTable,
    group: ValueGroup,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name(group.title())?;
    sheet.write_string(0, 0, LAP_COLUMN)?;
    for (column, driver) in (1u16..).zip(table.drivers()) {
        sheet.write_string(0, column, driver)?;
    }

    for (row, lap) in (1u32..).zip(table.laps()) {
        sheet.write_number(row, 0, lap)?;
        for (column, driver) in (1u16..).zip(table.drivers()) {
            match group {
                ValueGroup::LapTime => {
                    if let Some(time) = table.lap_time(lap, driver) {
                        sheet.write_string(row, column, time)?;
                    }
                }
                ValueGroup::RunningPosition => {
                    if let Some(position) = table.position(lap, driver) {
                        sheet.write_number(row, column, position)?;
                    }
                }
            }
        }
    }
    Ok(())
}

impl LapSink for WorkbookSink {
    fn mode(&self) -> OutputMode {
        OutputMode::Snapshot
    }

    fn write(&mut self, projection: &Projection) -> Result<()> {
        let Projection::Table(table) = projection else {
            return Err(mismatched_projection(&self.path, self.mode(), projection));
        };

        let bytes = self.render(table)?;
        let path = &self.path;
        let mut staged = NamedTempFile::new_in(&self.directory)
            .map_err(|e| LapFeedError::sink_error(path, e))?;
        staged.write_all(&bytes).map_err(|e| LapFeedError::sink_error(path, e))?;
        staged.as_file_mut().flush().map_err(|e| LapFeedError::sink_error(path, e))?;
        staged.as_file().sync_all().map_err(|e| LapFeedError::sink_error(path, e))?;
        staged.persist(path).map_err(|e| LapFeedError::sink_error(path, e.error))?;

        debug!(
            path = %path.display(),
            drivers = table.drivers().len(),
            rows = table.row_count(),
            "Wrote workbook"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{FlatRow, pivot};
    use calamine::{Reader, Xlsx, open_workbook};

    fn read_sheet(path: &Path, title: &str) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range(title).unwrap();
        range.rows().map(|row| row.iter().map(|cell| cell.to_string()).collect()).collect()
    }

    #[test]
    fn writes_both_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WorkbookSink::new(dir.path(), "indycar-2026-05-24").unwrap();
        assert_eq!(sink.path(), dir.path().join("indycar-2026-05-24.xlsx"));

        let table = pivot(&[
            FlatRow::new("A", 0, 1, ""),
            FlatRow::new("A", 1, 1, "1:00"),
            FlatRow::new("A", 2, 1, "0:59"),
            FlatRow::new("B", 1, 2, "1:05"),
        ]);
        sink.write(&Projection::Table(table)).unwrap();

        let workbook: Xlsx<_> = open_workbook(sink.path()).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Lap Time", "Running Position"]);

        assert_eq!(
            read_sheet(sink.path(), "Lap Time"),
            vec![
                vec!["Lap Number", "A", "B"],
                vec!["1", "1:00", "1:05"],
                vec!["2", "0:59", ""],
            ]
        );
        assert_eq!(
            read_sheet(sink.path(), "Running Position"),
            vec![vec!["Lap Number", "A", "B"], vec!["1", "1", "2"], vec!["2", "1", ""]]
        );
    }

    #[test]
    fn each_flush_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WorkbookSink::new(dir.path(), "snap").unwrap();

        sink.write(&Projection::Table(pivot(&[FlatRow::new("A", 1, 1, "1:00")]))).unwrap();
        sink.write(&Projection::Table(pivot(&[
            FlatRow::new("A", 1, 1, "1:00"),
            FlatRow::new("A", 2, 1, "0:59"),
        ])))
        .unwrap();

        assert_eq!(
            read_sheet(sink.path(), "Lap Time"),
            vec![vec!["Lap Number", "A"], vec!["1", "1:00"], vec!["2", "0:59"]]
        );

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "only the workbook should remain");
    }

    #[test]
    fn table_without_laps_writes_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WorkbookSink::new(dir.path(), "snap").unwrap();
        sink.write(&Projection::Table(pivot(&[FlatRow::new("A", 0, 3, "")]))).unwrap();

        assert_eq!(read_sheet(sink.path(), "Running Position"), vec![vec!["Lap Number", "A"]]);
    }

    #[test]
    fn rejects_flat_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WorkbookSink::new(dir.path(), "snap").unwrap();
        let result = sink.write(&Projection::Rows(vec![]));
        assert!(matches!(result, Err(LapFeedError::Sink { .. })));
        assert!(!sink.path().exists());
    }
}
