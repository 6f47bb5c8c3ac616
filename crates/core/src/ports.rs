//! Port interfaces for link discovery

use async_trait::async_trait;
use linkscout_domain::{FetchError, LinkDocument};
use url::Url;

/// One attempt to download the link document.
///
/// Implementations perform a single request bounded by their configured
/// timeout and never retry.
#[async_trait]
pub trait LinkFetcher: Send + Sync {
    /// Fetch and decode the link document served at `base_url`
    async fn fetch(&self, base_url: &Url) -> Result<LinkDocument, FetchError>;
}

/// Destination of bootstrap failure reports.
pub trait LogSink: Send + Sync {
    /// Record one error-level message
    fn error(&self, message: &str);
}

/// [`LogSink`] that forwards to `tracing` on target `linkscout::bootstrap`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn error(&self, message: &str) {
        tracing::error!(target: "linkscout::bootstrap", "{message}");
    }
}
