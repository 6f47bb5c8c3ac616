//! Backoff policy for the link bootstrap
//!
//! Failed fetches are retried forever by default, so the delay between
//! attempts is the only thing bounding how often failures are logged. Every
//! policy has a strictly positive minimum delay.

use std::time::Duration;

use linkscout_domain::constants::MAX_BACKOFF_CEILING_MS;
use linkscout_domain::{BootstrapConfig, ClientError, Result};
use rand::Rng;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^(retry - 1), capped at
    /// max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Delay before the given retry (1-based)
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
                let secs = initial_delay.as_secs_f64() * base.powi(exponent);
                let capped = secs.min(max_delay.as_secs_f64());
                Duration::try_from_secs_f64(capped).unwrap_or(*max_delay)
            }
        }
    }

    fn first_delay(&self) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, .. } => *initial_delay,
        }
    }

    fn longest_delay(&self) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, max_delay, .. } => (*initial_delay).max(*max_delay),
        }
    }
}

/// Jitter applied on top of the strategy's delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(self, delay: Duration) -> Duration {
        match self {
            Self::None => delay,
            Self::Equal => {
                let half = delay / 2;
                let spread = u64::try_from(half.as_nanos()).unwrap_or(u64::MAX);
                let extra = if spread == 0 { 0 } else { rand::thread_rng().gen_range(0..=spread) };
                half + Duration::from_nanos(extra)
            }
        }
    }
}

/// Delay policy between failed bootstrap attempts
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    strategy: BackoffStrategy,
    jitter: Jitter,
}

impl Default for BackoffPolicy {
    /// Exponential from 1s, doubling, capped at 30s, with equal jitter.
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Exponential {
                initial_delay: Duration::from_secs(1),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Equal,
        }
    }
}

impl BackoffPolicy {
    /// Fixed interval without jitter.
    pub fn fixed(delay: Duration) -> Self {
        Self { strategy: BackoffStrategy::Fixed(delay), jitter: Jitter::None }
    }

    pub fn exponential(initial_delay: Duration, base: f64, max_delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential { initial_delay, base, max_delay },
            jitter: Jitter::None,
        }
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Build the policy described by a [`BootstrapConfig`].
    ///
    /// A multiplier of exactly `1.0` yields a fixed interval.
    ///
    /// # Errors
    /// Returns `ClientError::Config` when the configuration is invalid.
    pub fn from_config(config: &BootstrapConfig) -> Result<Self> {
        config.validate()?;

        #[allow(clippy::float_cmp)]
        let policy = if config.multiplier == 1.0 {
            Self::fixed(config.initial_backoff)
        } else {
            Self::exponential(config.initial_backoff, config.multiplier, config.max_backoff)
        };

        let jitter = if config.jitter { Jitter::Equal } else { Jitter::None };
        Ok(policy.with_jitter(jitter))
    }

    /// Validate the policy
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the policy could retry without
    /// waiting or could wait longer than `MAX_BACKOFF_CEILING_MS`.
    pub fn validate(&self) -> Result<()> {
        if self.min_delay().is_zero() {
            return Err(ClientError::Config("backoff delay must be greater than 0".to_string()));
        }
        if self.strategy.longest_delay() > Duration::from_millis(MAX_BACKOFF_CEILING_MS) {
            return Err(ClientError::Config(format!(
                "backoff max_delay must not exceed {MAX_BACKOFF_CEILING_MS}ms"
            )));
        }
        if let BackoffStrategy::Exponential { base, .. } = self.strategy {
            if !base.is_finite() || base < 1.0 {
                return Err(ClientError::Config(
                    "exponential base must be at least 1.0".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }

    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Delay before the given retry (1-based), jitter included.
    pub fn delay(&self, retry: u32) -> Duration {
        self.jitter.apply(self.strategy.calculate_delay(retry))
    }

    /// Lower bound of every delay this policy can produce.
    pub fn min_delay(&self) -> Duration {
        let first = self.strategy.first_delay();
        match self.jitter {
            Jitter::None => first,
            Jitter::Equal => first / 2,
        }
    }
}
