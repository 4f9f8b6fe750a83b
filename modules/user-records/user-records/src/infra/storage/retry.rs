//! Retry-on-failure for transient database errors.
//!
//! The policy is driven by [`RetryConfig`]: an operation that fails with a
//! transient error is retried up to `max_retries` times, sleeping an
//! exponentially growing (and capped) backoff between attempts.

use std::time::Duration;

use rand::Rng;
use sea_orm::{DbErr, RuntimeErr};
use tracing::warn;

use crate::config::RetryConfig;

/// `SQLSTATE` / `SQLite` result codes that are safe to retry.
///
/// `PostgreSQL`: connection exceptions (class 08), serialization failure,
/// deadlock, too many connections, cannot connect now.
/// `SQLite`: BUSY, LOCKED and their extended variants.
const TRANSIENT_CODES: &[&str] = &[
    "08000", "08001", "08003", "08004", "08006", "40001", "40P01", "53300", "57P03", "5", "6",
    "261", "262", "517",
];

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Decide what to do after attempt number `attempt` (0-based) failed.
    ///
    /// Sleeps the backoff and returns the next attempt number when the error is
    /// transient and retries remain.
    ///
    /// # Errors
    /// Returns the original error when it is permanent, retries are disabled,
    /// or the retry budget is exhausted.
    pub async fn backoff_or_fail(
        &self,
        op: &'static str,
        attempt: u32,
        err: DbErr,
    ) -> Result<u32, DbErr> {
        if !self.config.enabled || attempt >= self.config.max_retries || !is_transient(&err) {
            return Err(err);
        }

        let delay = calculate_backoff(&self.config, attempt);
        warn!(
            op,
            attempt = attempt + 1,
            max_retries = self.config.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient database failure, retrying"
        );
        tokio::time::sleep(delay).await;
        Ok(attempt + 1)
    }
}

/// Whether a database error is worth retrying.
#[must_use]
pub fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            is_transient_sqlx(e)
        }
        _ => false,
    }
}

fn is_transient_sqlx(err: &sea_orm::sqlx::Error) -> bool {
    use sea_orm::sqlx::Error;

    match err {
        Error::Io(_) | Error::PoolTimedOut | Error::WorkerCrashed => true,
        Error::Database(db) => db
            .code()
            .is_some_and(|code| TRANSIENT_CODES.contains(&&*code)),
        _ => false,
    }
}

/// Exponential backoff for a 0-based attempt, capped at `max_backoff`.
#[must_use]
pub fn calculate_backoff(config: &RetryConfig, attempt: u32) -> Duration {
    let attempt = i32::try_from(attempt).unwrap_or(i32::MAX);

    let multiplier = if config.multiplier.is_finite() && config.multiplier >= 0.0 {
        config.multiplier
    } else {
        1.0
    };

    let raw_secs = config.initial_backoff.as_secs_f64() * multiplier.powi(attempt);
    let duration = if !raw_secs.is_finite() || raw_secs >= config.max_backoff.as_secs_f64() {
        config.max_backoff
    } else {
        Duration::from_secs_f64(raw_secs.max(0.0))
    };

    if config.jitter {
        let jitter_factor = rand::rng().random_range(0.0..=0.25);
        duration + duration.mul_f64(jitter_factor)
    } else {
        duration
    }
}
