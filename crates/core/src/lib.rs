//! # linkscout Core
//!
//! Link discovery logic - no HTTP dependencies.
//!
//! This crate contains:
//! - Port interfaces (`LinkFetcher`, `LogSink`)
//! - The bootstrap backoff policy
//! - The write-once link cache state machine
//! - The retrying bootstrapper
//!
//! ## Architecture Principles
//! - Only depends on `linkscout-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits

pub mod bootstrap;
pub mod ports;

pub use bootstrap::backoff::{BackoffPolicy, BackoffStrategy, Jitter};
pub use bootstrap::cache::{link_cache, LinkCache, LinkPublisher, LinkState};
pub use bootstrap::{BootstrapOutcome, Bootstrapper};
pub use ports::{LinkFetcher, LogSink, TracingLogSink};
