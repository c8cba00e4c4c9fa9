//! Timing source trait

use crate::Result;
use crate::feed::Payload;

/// Trait for timing data sources
///
/// Sources abstract over where payloads come from (the live HTTP endpoint,
/// captured bodies) and decode them into canonical payloads.
#[async_trait::async_trait]
pub trait TimingSource: Send + 'static {
    /// Fetch and decode the next payload
    ///
    /// Returns:
    /// - `Ok(Some(payload))` - Payload available
    /// - `Ok(None)` - Source exhausted (normal termination)
    /// - `Err(e)` - Fetch or parse failure
    async fn fetch(&mut self) -> Result<Option<Payload>>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}
