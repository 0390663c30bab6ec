//! Exponential backoff for startup operations such as the database connect.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff schedule for a retried operation.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Pause before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single pause.
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset for connecting to Postgres at startup.
    ///
    /// Pauses 1s, 2s, 4s, 8s, then 10s for every further attempt.
    pub fn db_connect(max_attempts: u32) -> Self {
        Self::new(max_attempts.max(1), Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(10))
            .with_backoff_multiplier(2.0)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Pause before `attempt` (0-indexed); the first attempt runs immediately.
    fn delay_before(&self, attempt: u32) -> Duration {
        let Some(exponent) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };
        let scaled = self
            .initial_delay
            .mul_f64(self.backoff_multiplier.powi(exponent as i32).max(0.0));
        scaled.min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::db_connect(5)
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects an error, or
/// the attempts run out. The last error is returned as is.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let attempts = config.attempts();
    let mut attempt = 0;

    loop {
        let delay = config.delay_before(attempt);
        if !delay.is_zero() {
            debug!(operation = operation_name, attempt = attempt + 1, ?delay, "Retrying");
            sleep(delay).await;
        }

        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !should_retry(&err) {
            debug!(operation = operation_name, error = %err, "Not retryable");
            return Err(err);
        }

        attempt += 1;
        if attempt >= attempts {
            warn!(operation = operation_name, attempts, error = %err, "Giving up");
            return Err(err);
        }
        warn!(
            operation = operation_name,
            attempt,
            remaining = attempts - attempt,
            error = %err,
            "Attempt failed"
        );
    }
}
