//! Domain constants
//!
//! Centralized location for the well-known relations and defaults shared by
//! the other linkscout crates.

/// Short relation of the remote API's health-check link.
///
/// Matched against namespaced relations such as
/// `http://example.com/swagger#!/info/health`.
pub const HEALTH_CHECK_REL: &str = "info/health";

/// Prefix of every bootstrap failure log entry.
pub const BOOTSTRAP_LOG_PREFIX: &str = "cannot get api links:";

// Transport defaults
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_ACTION_METHOD: &str = "POST";

// Bootstrap backoff defaults
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Upper bound accepted for any single backoff delay (one hour).
pub const MAX_BACKOFF_CEILING_MS: u64 = 3_600_000;

pub const DEFAULT_LOG_LEVEL: &str = "info";
