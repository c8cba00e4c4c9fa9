//! Runtime settings
//!
//! Settings are layered with `figment`:
//! 1. `lapfeed.toml` (or the file named by `LAPFEED_CONFIG`)
//! 2. Environment variables prefixed with `LAPFEED_`
//!
//! Every option has a default, so an empty or missing file yields a working
//! IndyCar snapshot setup.
//!
//! # Example
//! ```no_run
//! use lapfeed::config::Settings;
//!
//! let settings = Settings::load_from("lapfeed.toml")?;
//! settings.validate()?;
//! println!("Polling {}", settings.endpoint()?);
//! # Ok::<(), lapfeed::LapFeedError>(())
//! ```

use chrono::NaiveDate;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::feed::FeedFormat;
use crate::types::OutputMode;
use crate::{LapFeedError, Result};

/// Settings file read when `LAPFEED_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "lapfeed.toml";

/// Variable naming an alternative settings file
pub const CONFIG_PATH_VAR: &str = "LAPFEED_CONFIG";

/// Prefix for environment overrides, e.g. `LAPFEED_OUTPUT_MODE=append`
pub const ENV_PREFIX: &str = "LAPFEED_";

/// Ingester settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Timing endpoint; the feed's public endpoint when unset
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// Delay between the end of one cycle and the next poll
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Directory receiving the output files
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    #[serde(default)]
    pub output_mode: OutputMode,

    #[serde(default)]
    pub feed: FeedFormat,

    /// Connect and read timeout for each poll
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Seed ledgers from an existing append log on startup
    #[serde(default = "default_resume")]
    pub resume: bool,

    /// Replay captured bodies from this directory instead of polling
    #[serde(default)]
    pub replay_directory: Option<PathBuf>,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("data")
}

fn default_request_timeout() -> u64 {
    10
}

fn default_resume() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: None,
            poll_interval_seconds: default_poll_interval(),
            output_directory: default_output_directory(),
            output_mode: OutputMode::default(),
            feed: FeedFormat::default(),
            request_timeout_seconds: default_request_timeout(),
            resume: default_resume(),
            replay_directory: None,
        }
    }
}

impl Settings {
    /// Load from the default file, or the one named by `LAPFEED_CONFIG`
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(path)
    }

    /// Load from a specific file plus environment overrides.
    ///
    /// A missing file is not an error; defaults and the environment apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(path.as_ref()))
                .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"])),
        )
    }

    /// Extract settings from an already layered figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_seconds == 0 {
            return Err(LapFeedError::config_error("poll_interval_seconds must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(LapFeedError::config_error(
                "request_timeout_seconds must be greater than 0",
            ));
        }
        if self.output_directory.as_os_str().is_empty() {
            return Err(LapFeedError::config_error("output_directory must not be empty"));
        }
        if self.replay_directory.is_none() {
            self.endpoint()?;
        }
        Ok(())
    }

    /// Endpoint to poll
    pub fn endpoint(&self) -> Result<String> {
        match self.api_endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Ok(endpoint.to_string()),
            _ => self.feed.default_endpoint().map(str::to_string).ok_or_else(|| {
                LapFeedError::config_error(format!(
                    "feed '{}' has no public endpoint; set api_endpoint",
                    self.feed
                ))
            }),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Output file stem for a session on `date`: `<feed>-<YYYY-MM-DD>`
    pub fn output_stem(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.feed, date.format("%Y-%m-%d"))
    }

    /// Path of the append-mode log for a session on `date`
    pub fn append_log_path(&self, date: NaiveDate) -> PathBuf {
        self.output_directory.join(format!("{}.csv", self.output_stem(date)))
    }
}
