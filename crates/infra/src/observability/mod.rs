//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and tests decide where
//! they go by calling [`init_tracing`] once at startup.

use linkscout_domain::{ClientError, LogConfig, Result};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Install a global fmt subscriber for `config`.
///
/// The level in `config` is a full `EnvFilter` directive (`info`,
/// `linkscout=debug,reqwest=warn`, ...). A valid `RUST_LOG` overrides it.
///
/// # Errors
/// Returns `ClientError::Config` for an invalid level directive or when a
/// global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let configured = EnvFilter::try_new(&config.level).map_err(|e| {
        ClientError::Config(format!("invalid log level {:?}: {e}", config.level))
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(configured);

    let layer = if config.json {
        fmt::layer().json().with_current_span(true).with_filter(filter).boxed()
    } else {
        fmt::layer().with_target(true).with_filter(filter).boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| ClientError::Config(format!("Failed to initialize tracing: {e}")))?;

    tracing::debug!(level = %config.level, json = config.json, "tracing initialized");
    Ok(())
}
