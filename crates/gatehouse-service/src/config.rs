//! Engine configuration loaded from environment variables.
//!
//! Fail-fast loading: a present-but-invalid variable is a configuration
//! error, never a silent fallback to the default.

use gatehouse_store::RetryPolicy;
use std::time::Duration;
use thiserror::Error;

/// Default token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Default page size for admin listing operations.
pub const DEFAULT_PAGE_LIMIT: usize = 25;

/// Default interval between expired-token sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be used.
    #[error("Invalid value for {var}: {message}")]
    Invalid {
        /// The environment variable name.
        var: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct GatehouseConfig {
    /// Lifetime of newly minted tokens.
    pub token_ttl: chrono::Duration,
    /// Default page size for listings; callers may override per request.
    pub page_limit: usize,
    /// Retry schedule for the store adapter.
    pub retry: RetryPolicy,
    /// Interval between expired-token sweeps.
    pub sweep_interval: Duration,
}

impl Default for GatehouseConfig {
    fn default() -> Self {
        Self {
            token_ttl: chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            page_limit: DEFAULT_PAGE_LIMIT,
            retry: RetryPolicy::default(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl GatehouseConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any variable that is set but
    /// unparseable or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<i64>(&lookup, "GATEHOUSE_TOKEN_TTL_SECS")? {
            if secs <= 0 {
                return Err(ConfigError::Invalid {
                    var: "GATEHOUSE_TOKEN_TTL_SECS",
                    message: "must be positive".into(),
                });
            }
            config.token_ttl = chrono::Duration::seconds(secs);
        }

        if let Some(limit) = parse_var::<usize>(&lookup, "GATEHOUSE_PAGE_LIMIT")? {
            if limit == 0 {
                return Err(ConfigError::Invalid {
                    var: "GATEHOUSE_PAGE_LIMIT",
                    message: "must be positive".into(),
                });
            }
            config.page_limit = limit;
        }

        if let Some(attempts) = parse_var::<u32>(&lookup, "GATEHOUSE_STORE_RETRY_ATTEMPTS")? {
            config.retry.attempts = attempts.max(1);
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "GATEHOUSE_STORE_RETRY_BACKOFF_MS")? {
            config.retry.backoff = Duration::from_millis(ms);
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "GATEHOUSE_SWEEP_INTERVAL_SECS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "GATEHOUSE_SWEEP_INTERVAL_SECS",
                    message: "must be positive".into(),
                });
            }
            config.sweep_interval = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e| ConfigError::Invalid {
            var,
            message: format!("{e}"),
        }),
    }
}
