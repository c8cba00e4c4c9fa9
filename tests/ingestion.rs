//! End-to-end ingestion from recorded bodies into files on disk

use calamine::{Reader, Xlsx, open_workbook};
use lapfeed::{
    CsvAppendSink, FeedFormat, FlatRow, IngestState, Ingestor, LapFeedError, RecordedSource,
    ValueGroup, WorkbookSink,
};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;

type Laps<'a> = &'a [(u32, Option<&'a str>, u32)];

fn nascar_poll(elliott: Laps<'_>, byron: Laps<'_>) -> String {
    let laps = |laps: Laps<'_>| {
        laps.iter()
            .map(|&(lap, time, pos)| json!({ "Lap": lap, "LapTime": time, "RunningPos": pos }))
            .collect::<Vec<_>>()
    };
    json!({
        "laps": [
            { "NASCARDriverID": 4025, "Number": "9", "FullName": "Chase Elliott",
              "Manufacturer": "Chv", "Laps": laps(elliott) },
            { "NASCARDriverID": 4164, "Number": "24", "FullName": "William Byron",
              "Manufacturer": "Chv", "Laps": laps(byron) },
        ]
    })
    .to_string()
}

/// `(laps, last lap time, overall rank)` as the feed reports them
type Timing<'a> = (&'a str, &'a str, &'a str);

fn indycar_item(id: &str, car: &str, first: &str, last: &str, timing: Timing<'_>) -> Value {
    let (laps, time, rank) = timing;
    json!({
        "DriverID": id, "EntrantID": car, "firstName": first, "lastName": last,
        "team": "Chip Ganassi Racing", "laps": laps, "lastLapTime": time, "overallRank": rank,
    })
}

fn indycar_poll(dixon: Timing<'_>, palou: Timing<'_>) -> String {
    let document = json!({
        "timing_results": {
            "heartbeat": { "SessionStatus": "GREEN" },
            "Item": [
                indycar_item("3207", "9", "Scott", "Dixon", dixon),
                indycar_item("3890", "10", "Alex", "Palou", palou),
            ]
        }
    });
    format!("jsonCallback({document});")
}

fn lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

fn sheet_rows(path: &Path, group: ValueGroup) -> Vec<String> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range(group.title()).unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>().join(","))
        .collect()
}

#[tokio::test]
async fn nascar_append_log_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("nascar-2026-02-15.csv");

    let first_run = RecordedSource::from_bodies(
        FeedFormat::Nascar,
        [
            nascar_poll(&[(0, None, 3), (1, Some("47.912"), 2)], &[(0, None, 1)]),
            nascar_poll(
                &[(0, None, 3), (1, Some("47.912"), 2), (2, Some("47.450"), 1)],
                &[(0, None, 1), (1, Some("48.001"), 1)],
            ),
        ],
    );
    let sink = CsvAppendSink::open(&log).unwrap();
    let mut ingestor = Ingestor::bootstrap(first_run, sink, Duration::ZERO).await.unwrap();
    ingestor.run().await.unwrap();
    drop(ingestor);

    // Restarted process sees the same laps again plus one new one
    let second_run = RecordedSource::from_bodies(
        FeedFormat::Nascar,
        [nascar_poll(
            &[(0, None, 3), (1, Some("47.912"), 2), (2, Some("47.450"), 1)],
            &[(0, None, 1), (1, Some("48.001"), 1), (2, Some("47.380"), 1)],
        )],
    );
    let previous = CsvAppendSink::read_existing(&log).unwrap();
    let sink = CsvAppendSink::open(&log).unwrap();
    let mut ingestor = Ingestor::bootstrap(second_run, sink, Duration::ZERO).await.unwrap();
    assert_eq!(ingestor.resume(&previous), previous.len());
    ingestor.run().await.unwrap();

    assert_eq!(
        lines(&log),
        vec![
            "Name,Lap Number,Running Position,Lap Time",
            "Chase Elliott,0,3,",
            "Chase Elliott,1,2,47.912",
            "William Byron,0,1,",
            "Chase Elliott,2,1,47.450",
            "William Byron,1,1,48.001",
            "William Byron,2,1,47.380",
        ]
    );

    let rows = CsvAppendSink::read_existing(&log).unwrap();
    assert_eq!(rows[1], FlatRow::new("Chase Elliott", 1, 2, "47.912"));
}

#[tokio::test]
async fn indycar_snapshot_rewrites_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let source = RecordedSource::from_bodies(
        FeedFormat::IndyCar,
        [
            indycar_poll(("", "", ""), ("", "", "")),
            indycar_poll(("1", "1:07.8123", "2"), ("1", "1:07.5001", "1")),
            indycar_poll(("1", "1:07.8123", "2"), ("1", "1:07.5001", "1")),
            indycar_poll(("2", "1:06.9910", "1"), ("2", "1:07.2000", "2")),
        ],
    );
    let sink = WorkbookSink::new(dir.path(), "indycar-2026-05-24").unwrap();
    let mut ingestor = Ingestor::bootstrap(source, sink, Duration::ZERO).await.unwrap();

    let mut flushed = Vec::new();
    while let Some(report) = ingestor.poll_once().await.unwrap() {
        flushed.push(report.flushed);
    }
    assert_eq!(flushed, vec![false, true, false, true]);

    let workbook = ingestor.sink().path();
    assert_eq!(workbook, dir.path().join("indycar-2026-05-24.xlsx"));

    let times = sheet_rows(workbook, ValueGroup::LapTime);
    assert_eq!(
        times,
        vec![
            "Lap Number,Alex Palou,Scott Dixon",
            "1,1:07.5001,1:07.8123",
            "2,1:07.2000,1:06.9910",
        ]
    );

    let positions = sheet_rows(workbook, ValueGroup::RunningPosition);
    assert_eq!(positions, vec!["Lap Number,Alex Palou,Scott Dixon", "1,1,2", "2,2,1"]);
}

#[tokio::test]
async fn late_entry_stops_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let late_entry = json!({
        "laps": [
            { "NASCARDriverID": 4025, "Number": "9", "FullName": "Chase Elliott",
              "Manufacturer": "Chv", "Laps": [] },
            { "NASCARDriverID": 9999, "Number": "99", "FullName": "Late Entry",
              "Manufacturer": "Frd", "Laps": [] },
        ]
    })
    .to_string();
    let source = RecordedSource::from_bodies(
        FeedFormat::Nascar,
        [nascar_poll(&[(1, Some("47.9"), 1)], &[]), late_entry],
    );
    let sink = CsvAppendSink::open(dir.path().join("laps.csv")).unwrap();
    let mut ingestor = Ingestor::bootstrap(source, sink, Duration::ZERO).await.unwrap();

    let error = ingestor.run().await.unwrap_err();
    assert!(matches!(error, LapFeedError::UnknownDriver { ref driver_id } if driver_id == "9999"));
    assert_eq!(ingestor.state(), IngestState::Failed);
    assert_eq!(lines(&dir.path().join("laps.csv")).len(), 2);
}
