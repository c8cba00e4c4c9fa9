//! Error types for lap ingestion.
//!
//! Every failure the ingestion engine can hit maps onto one [`LapFeedError`]
//! variant. All errors implement `std::error::Error` and carry enough context
//! (endpoint, entry index, driver id, file path) to diagnose a failed run from
//! the log alone.
//!
//! ## Error Categories
//!
//! - **Fetch Errors**: Transport failures talking to the timing API
//! - **Parse Errors**: Bodies that cannot be unwrapped or decoded
//! - **Unknown Driver Errors**: Payload entries outside the session roster
//! - **Malformed Payload Errors**: Roster construction missing required fields
//! - **Sink Errors**: Output files that cannot be written
//! - **Config Errors**: Invalid or unreadable settings
//! - **Halted**: Polling an ingestion loop that already failed
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use lapfeed::LapFeedError;
//!
//! let error = LapFeedError::fetch_failed("http://timing.example/feed", "connection refused");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lap ingestion operations.
pub type Result<T, E = LapFeedError> = std::result::Result<T, E>;

/// Main error type for lap ingestion.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LapFeedError {
    #[error("Failed to fetch timing data from {endpoint}: {reason}")]
    Fetch {
        endpoint: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Driver '{driver_id}' is not part of the session roster")]
    UnknownDriver { driver_id: String },

    #[error("Malformed payload entry {entry}: missing required field '{field}'")]
    MalformedPayload { entry: usize, field: String },

    #[error("Output sink error: {path}")]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {details}")]
    Config { details: String },

    #[error("Ingestion halted after failure in cycle {cycle}")]
    Halted { cycle: u64 },
}

impl LapFeedError {
    /// Returns whether this error is potentially recoverable through retry.
    ///
    /// The ingestion loop itself never retries; this is the hook a hardened
    /// caller would use to wrap fetches in a backoff policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            LapFeedError::Fetch { .. } => true,
            LapFeedError::Parse { .. } => false,
            LapFeedError::UnknownDriver { .. } => false,
            LapFeedError::MalformedPayload { .. } => false,
            LapFeedError::Sink { .. } => false,
            LapFeedError::Config { .. } => false,
            LapFeedError::Halted { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LapFeedError::Fetch { .. } => vec![
                "Check network connectivity to the timing API",
                "Verify the configured api_endpoint",
                "Increase request_timeout_seconds",
            ],
            LapFeedError::Parse { .. } => vec![
                "Check whether the provider changed its payload format",
                "Verify the configured feed matches the endpoint",
                "Capture the raw body and replay it with a recorded source",
            ],
            LapFeedError::UnknownDriver { .. } => vec![
                "Restart the ingester to rebuild the roster",
                "Check the feed for mid-session entry list changes",
            ],
            LapFeedError::MalformedPayload { .. } => vec![
                "Wait until the session entry list is published",
                "Verify the configured feed matches the endpoint",
            ],
            LapFeedError::Sink { .. } => vec![
                "Check output directory permissions",
                "Ensure sufficient disk space",
                "Close spreadsheet programs holding the output file",
            ],
            LapFeedError::Config { .. } => vec![
                "Check the configuration file syntax",
                "Review LAPFEED_ environment variable overrides",
            ],
            LapFeedError::Halted { .. } => {
                vec!["Inspect the error logged for the failed cycle", "Restart the ingester"]
            }
        }
    }

    /// Helper constructor for fetch errors.
    pub fn fetch_failed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        LapFeedError::Fetch { endpoint: endpoint.into(), reason: reason.into(), source: None }
    }

    /// Helper constructor for fetch errors with source.
    pub fn fetch_failed_with_source(
        endpoint: impl Into<String>,
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LapFeedError::Fetch {
            endpoint: endpoint.into(),
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        LapFeedError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for unknown driver errors.
    pub fn unknown_driver(driver_id: impl Into<String>) -> Self {
        LapFeedError::UnknownDriver { driver_id: driver_id.into() }
    }

    /// Helper constructor for malformed payload errors.
    pub fn malformed_payload(entry: usize, field: impl Into<String>) -> Self {
        LapFeedError::MalformedPayload { entry, field: field.into() }
    }

    /// Helper constructor for sink errors with path context.
    pub fn sink_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LapFeedError::Sink { path: path.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        LapFeedError::Config { details: details.into() }
    }
}

impl From<std::io::Error> for LapFeedError {
    fn from(err: std::io::Error) -> Self {
        LapFeedError::Sink { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<figment::Error> for LapFeedError {
    fn from(err: figment::Error) -> Self {
        LapFeedError::Config { details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_carry_their_context(
                endpoint in "[a-z]{1,12}",
                reason in ".*",
                driver_id in "\\w+",
                entry in 0usize..500,
                field in "[A-Za-z]+",
                details in ".*"
            ) {
                let fetch = LapFeedError::fetch_failed(endpoint.clone(), reason.clone());
                let unknown = LapFeedError::unknown_driver(driver_id.clone());
                let malformed = LapFeedError::malformed_payload(entry, field.clone());
                let parse = LapFeedError::parse_error("feed body", details.clone());

                let fetch_msg = fetch.to_string();
                prop_assert!(fetch_msg.contains(&endpoint));
                prop_assert!(fetch_msg.contains(&reason));
                prop_assert!(unknown.to_string().contains(&driver_id));

                let malformed_msg = malformed.to_string();
                prop_assert!(malformed_msg.contains(&entry.to_string()));
                prop_assert!(malformed_msg.contains(&field));

                prop_assert!(parse.to_string().contains(&details));
            }

            #[test]
            fn io_conversions_preserve_message(reason in ".*") {
                let io_err = std::io::Error::other(reason.clone());
                let converted: LapFeedError = io_err.into();
                match converted {
                    LapFeedError::Sink { source, .. } => {
                        prop_assert_eq!(source.to_string(), reason);
                    }
                    _ => prop_assert!(false, "Expected Sink error from io::Error conversion"),
                }
            }
        }
    }

    #[test]
    fn only_fetch_errors_are_retryable() {
        assert!(LapFeedError::fetch_failed("x", "timeout").is_retryable());
        assert!(!LapFeedError::parse_error("body", "bad json").is_retryable());
        assert!(!LapFeedError::unknown_driver("D9").is_retryable());
        assert!(!LapFeedError::malformed_payload(0, "DriverID").is_retryable());
        assert!(!LapFeedError::config_error("zero interval").is_retryable());
        assert!(
            !LapFeedError::sink_error("out.csv", std::io::Error::other("disk full")).is_retryable()
        );
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = [
            LapFeedError::fetch_failed("x", "timeout"),
            LapFeedError::parse_error("body", "bad json"),
            LapFeedError::unknown_driver("D9"),
            LapFeedError::malformed_payload(3, "FullName"),
            LapFeedError::sink_error("out.csv", std::io::Error::other("disk full")),
            LapFeedError::config_error("zero interval"),
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "{error} has no suggestions");
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn fetch_source_is_chained() {
        let inner = std::io::Error::other("connection reset");
        let error = LapFeedError::fetch_failed_with_source("x", "transport", Box::new(inner));
        let source = std::error::Error::source(&error).expect("source should be chained");
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn error_is_send_sync_static() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<LapFeedError>();
    }
}
