//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use url::Url;

use crate::constants::{
    DEFAULT_ACTION_METHOD, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF_MS,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_BACKOFF_MS, DEFAULT_TIMEOUT_MS, MAX_BACKOFF_CEILING_MS,
};
use crate::errors::{ClientError, Result};

/// Client configuration
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root resource of the remote API; the link document is fetched from here.
    pub base_url: Url,

    /// Per-request timeout applied to every network call
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "timeout_ms", default = "default_timeout")]
    pub timeout: Duration,

    /// HTTP method used by `take_action`
    #[serde(default = "default_action_method")]
    pub action_method: String,

    /// Accept invalid TLS certificates (self-signed test deployments only)
    #[serde(default)]
    pub insecure_tls: bool,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Retry policy of the link bootstrap
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "initial_backoff_ms", default = "default_initial_backoff")]
    pub initial_backoff: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "max_backoff_ms", default = "default_max_backoff")]
    pub max_backoff: Duration,

    /// Growth factor between consecutive delays; `1.0` means a fixed interval.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Randomize each delay within `[delay / 2, delay]`
    #[serde(default = "default_true")]
    pub jitter: bool,

    /// Give up waiting for links after this long. `None` waits forever.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(rename = "max_wait_ms", default)]
    pub max_wait: Option<Duration>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl ClientConfig {
    /// Configuration with default settings for `base_url` and `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self {
            base_url,
            timeout,
            action_method: default_action_method(),
            insecure_tls: false,
            auth_token: None,
            user_agent: None,
            bootstrap: BootstrapConfig::default(),
            log: LogConfig::default(),
        }
    }

    pub fn with_bootstrap(mut self, bootstrap: BootstrapConfig) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_action_method(mut self, method: impl Into<String>) -> Self {
        self.action_method = method.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_insecure_tls(mut self, enabled: bool) -> Self {
        self.insecure_tls = enabled;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `ClientError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ClientError::Config(format!(
                    "base_url must use http or https, got {other}"
                )))
            }
        }

        if self.timeout.is_zero() {
            return Err(ClientError::Config("timeout must be greater than 0".to_string()));
        }

        if self.action_method.trim().is_empty() {
            return Err(ClientError::Config("action_method must not be empty".to_string()));
        }

        self.bootstrap.validate()
    }
}

impl BootstrapConfig {
    /// Fixed retry interval without jitter.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_backoff: interval,
            max_backoff: interval,
            multiplier: 1.0,
            jitter: false,
            max_wait: None,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Validate the retry policy
    ///
    /// A non-zero initial delay is what keeps failure logging bounded.
    ///
    /// # Errors
    /// Returns `ClientError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let ceiling = Duration::from_millis(MAX_BACKOFF_CEILING_MS);

        if self.initial_backoff.is_zero() {
            return Err(ClientError::Config("initial_backoff must be greater than 0".to_string()));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(ClientError::Config(
                "max_backoff must not be smaller than initial_backoff".to_string(),
            ));
        }
        if self.max_backoff > ceiling {
            return Err(ClientError::Config(format!(
                "max_backoff must not exceed {MAX_BACKOFF_CEILING_MS}ms"
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ClientError::Config("multiplier must be at least 1.0".to_string()));
        }
        if self.max_wait.is_some_and(|wait| wait.is_zero()) {
            return Err(ClientError::Config("max_wait must be greater than 0".to_string()));
        }

        Ok(())
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
            multiplier: default_multiplier(),
            jitter: true,
            max_wait: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}

fn default_action_method() -> String {
    DEFAULT_ACTION_METHOD.to_string()
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS)
}

fn default_max_backoff() -> Duration {
    Duration::from_millis(DEFAULT_MAX_BACKOFF_MS)
}

fn default_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
