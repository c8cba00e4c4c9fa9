//! Live timing source polling an HTTP endpoint

use std::time::Duration;
use tracing::{debug, trace};

use crate::feed::{FeedFormat, Payload};
use crate::source::TimingSource;
use crate::{LapFeedError, Result};

/// Polls a timing endpoint with a blocking `ureq` agent
pub struct HttpSource {
    agent: ureq::Agent,
    endpoint: String,
    format: FeedFormat,
}

impl HttpSource {
    /// Create a source for `endpoint`, decoding bodies as `format`
    pub fn new(endpoint: impl Into<String>, format: FeedFormat, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(concat!("lapfeed/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent, endpoint: endpoint.into(), format }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl TimingSource for HttpSource {
    async fn fetch(&mut self) -> Result<Option<Payload>> {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();

        let body = tokio::task::spawn_blocking(move || get_body(&agent, &endpoint))
            .await
            .map_err(|e| {
                LapFeedError::fetch_failed_with_source(
                    self.endpoint.as_str(),
                    "fetch task did not complete",
                    Box::new(e),
                )
            })??;

        trace!(bytes = body.len(), feed = %self.format, "Fetched timing body");
        let payload = self.format.decode(&body)?;
        debug!(entries = payload.entries.len(), "Decoded timing payload");
        Ok(Some(payload))
    }

    fn describe(&self) -> String {
        format!("{} feed at {}", self.format, self.endpoint)
    }
}

fn get_body(agent: &ureq::Agent, endpoint: &str) -> Result<String> {
    match agent.get(endpoint).call() {
        Ok(response) => response.into_string().map_err(|e| {
            LapFeedError::fetch_failed_with_source(endpoint, "failed to read body", Box::new(e))
        }),
        Err(ureq::Error::Status(code, _)) => {
            Err(LapFeedError::fetch_failed(endpoint, format!("http status {code}")))
        }
        Err(ureq::Error::Transport(transport)) => Err(LapFeedError::fetch_failed_with_source(
            endpoint,
            "transport error",
            Box::new(transport),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_endpoint_is_a_fetch_error() {
        // Port 9 on localhost (discard) is closed on test hosts
        let mut source = HttpSource::new(
            "http://127.0.0.1:9/timing.json",
            FeedFormat::Nascar,
            Duration::from_millis(500),
        );

        match source.fetch().await {
            Err(error @ LapFeedError::Fetch { .. }) => assert!(error.is_retryable()),
            other => panic!("Expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn describe_names_feed_and_endpoint() {
        let source =
            HttpSource::new("http://timing.test/x", FeedFormat::IndyCar, Duration::from_secs(1));
        assert_eq!(source.describe(), "indycar feed at http://timing.test/x");
        assert_eq!(source.endpoint(), "http://timing.test/x");
    }
}
