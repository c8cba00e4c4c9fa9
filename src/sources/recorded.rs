//! Recorded timing source
//!
//! Replays previously captured response bodies in order, then reports the
//! source as exhausted. Used for dry runs against a saved session and for
//! driving the ingestion loop in tests.

use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, info};

use crate::feed::{FeedFormat, Payload};
use crate::source::TimingSource;
use crate::{LapFeedError, Result};

const BODY_EXTENSIONS: [&str; 3] = ["json", "js", "txt"];

/// Source replaying captured bodies
#[derive(Debug, Clone)]
pub struct RecordedSource {
    bodies: VecDeque<String>,
    format: FeedFormat,
    label: String,
    replayed: usize,
}

impl RecordedSource {
    /// Replay in-memory bodies in the given order
    pub fn from_bodies<I, B>(format: FeedFormat, bodies: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<String>,
    {
        let bodies: VecDeque<String> = bodies.into_iter().map(Into::into).collect();
        let label = format!("{} in-memory bodies", bodies.len());
        Self { bodies, format, label, replayed: 0 }
    }

    /// Replay every captured body in `directory`, ordered by file name
    pub fn open_dir<P: AsRef<Path>>(directory: P, format: FeedFormat) -> Result<Self> {
        let directory = directory.as_ref();
        let read_error = |e: std::io::Error| {
            LapFeedError::fetch_failed_with_source(
                directory.display().to_string(),
                "cannot read recorded bodies",
                Box::new(e),
            )
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(directory).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            let is_body = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| BODY_EXTENSIONS.contains(&ext));
            if path.is_file() && is_body {
                paths.push(path);
            }
        }
        paths.sort();

        let bodies = paths
            .iter()
            .map(|path| std::fs::read_to_string(path).map_err(read_error))
            .collect::<Result<VecDeque<_>>>()?;

        info!(directory = %directory.display(), bodies = bodies.len(), "Loaded recorded bodies");
        Ok(Self { bodies, format, label: directory.display().to_string(), replayed: 0 })
    }

    /// Bodies not replayed yet
    pub fn remaining(&self) -> usize {
        self.bodies.len()
    }
}

#[async_trait::async_trait]
impl TimingSource for RecordedSource {
    async fn fetch(&mut self) -> Result<Option<Payload>> {
        let Some(body) = self.bodies.pop_front() else {
            debug!(replayed = self.replayed, "Recorded source exhausted");
            return Ok(None);
        };
        self.replayed += 1;
        self.format.decode(&body).map(Some)
    }

    fn describe(&self) -> String {
        format!("recorded {} feed ({})", self.format, self.label)
    }
}
