//! lapfeed ingester
//!
//! Reads settings from `lapfeed.toml` (or `LAPFEED_CONFIG`) plus `LAPFEED_*`
//! environment overrides, then polls until the source ends or a cycle fails.

use anyhow::Context;
use chrono::NaiveDate;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lapfeed::config::Settings;
use lapfeed::{
    CsvAppendSink, HttpSource, Ingestor, LapSink, OutputMode, RecordedSource, TimingSource,
    WorkbookSink,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load().context("loading settings")?;
    settings.validate().context("validating settings")?;
    let date = chrono::Local::now().date_naive();

    match &settings.replay_directory {
        Some(directory) => {
            let source = RecordedSource::open_dir(directory, settings.feed)
                .with_context(|| format!("opening replay directory {}", directory.display()))?;
            start(&settings, date, source).await
        }
        None => {
            let source =
                HttpSource::new(settings.endpoint()?, settings.feed, settings.request_timeout());
            info!(endpoint = source.endpoint(), feed = %settings.feed, "Polling live feed");
            start(&settings, date, source).await
        }
    }
}

async fn start<S>(settings: &Settings, date: NaiveDate, source: S) -> anyhow::Result<()>
where
    S: TimingSource,
{
    match settings.output_mode {
        OutputMode::Append => {
            let path = settings.append_log_path(date);
            let previous = if settings.resume {
                CsvAppendSink::read_existing(&path)
                    .with_context(|| format!("reading existing log {}", path.display()))?
            } else {
                Vec::new()
            };
            let sink = CsvAppendSink::open(&path)?;
            info!(path = %sink.path().display(), "Appending new laps");
            ingest(settings, source, sink, &previous).await
        }
        OutputMode::Snapshot => {
            let sink = WorkbookSink::new(&settings.output_directory, settings.output_stem(date))?;
            info!(path = %sink.path().display(), "Writing workbook snapshots");
            ingest(settings, source, sink, &[]).await
        }
    }
}

async fn ingest<S, K>(
    settings: &Settings,
    source: S,
    sink: K,
    previous: &[lapfeed::FlatRow],
) -> anyhow::Result<()>
where
    S: TimingSource,
    K: LapSink,
{
    let mut ingestor = Ingestor::bootstrap(source, sink, settings.poll_interval())
        .await
        .context("building roster from the first payload")?;

    if !previous.is_empty() {
        let restored = ingestor.resume(previous);
        if restored < previous.len() {
            warn!(rows = previous.len(), restored, "Some logged laps were not restored");
        }
    }

    if let Err(error) = ingestor.run().await {
        for suggestion in error.recovery_suggestions() {
            warn!(suggestion, "Recovery hint");
        }
        return Err(error).context("ingestion stopped");
    }
    Ok(())
}
