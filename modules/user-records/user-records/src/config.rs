use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection info for the storage context.
///
/// `dsn` carries the `DefaultConnection` string; everything else has defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            pool: PoolConfig::default(),
            retry: RetryConfig::default(),
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Config for the given DSN with default pool and retry settings.
    #[must_use]
    pub fn with_dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Self::default()
        }
    }
}

/// Connection pool knobs; each driver applies the subset it supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    #[serde(default = "default_max_conns")]
    pub max_conns: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_conns: Option<u32>,
    #[serde(with = "humantime_serde", default = "default_acquire_timeout")]
    pub acquire_timeout: Duration,
    #[serde(
        with = "humantime_serde",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub idle_timeout: Option<Duration>,
    #[serde(
        with = "humantime_serde",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_lifetime: Option<Duration>,
    /// How long `SQLite` waits on a locked database before reporting BUSY.
    #[serde(
        with = "humantime_serde",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub busy_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_conns: default_max_conns(),
            min_conns: None,
            acquire_timeout: default_acquire_timeout(),
            idle_timeout: None,
            max_lifetime: None,
            busy_timeout: None,
        }
    }
}

/// Retry-on-failure policy for transient database errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Retries after the initial attempt (total attempts = 1 + `max_retries`).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(with = "humantime_serde", default = "default_initial_backoff")]
    pub initial_backoff: Duration,
    #[serde(with = "humantime_serde", default = "default_max_backoff")]
    pub max_backoff: Duration,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Adds a random 0-25% delay to each backoff.
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: default_max_retries(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
            multiplier: default_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Fast backoff for tests (1ms initial, 10ms max, no jitter).
    #[must_use]
    pub fn fast() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(10),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_conns() -> u32 {
    10
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    6
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(100)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(30)
}

fn default_multiplier() -> f64 {
    2.0
}
