//! Bounded exponential-backoff retries.
//!
//! Used by owner enrichment: transient failures (connection errors, timeouts)
//! are retried with a doubling delay, anything else ends the attempt loop.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::github::short_error_message;
use crate::progress::{Progress, ProgressCallback, emit};

/// Total attempts per request, including the first.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Delay before the second attempt; doubles after every failure.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Delay after the first failed attempt.
    pub min_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Maximum number of attempts, including the first one.
    pub max_attempts: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            with_jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_attempts: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_attempts,
            with_jitter: false,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Number of retries after the first attempt.
    #[must_use]
    pub fn max_retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_retries());

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Execute an operation, retrying while `is_transient` says the error may clear up.
///
/// - Tracks attempts with an atomic counter
/// - Sleeps `min_delay`, `2 * min_delay`, ... between attempts (capped at `max_delay`)
/// - Reports each backoff via callback and a warn-level log line
/// - Never sleeps after the last attempt
///
/// The final error is returned unchanged; callers decide whether it is fatal.
pub async fn with_retry<T, E, F, Fut, IsTransient>(
    mut operation: F,
    is_transient: IsTransient,
    config: &RetryConfig,
    label: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error,
    IsTransient: Fn(&E) -> bool,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err, dur| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            let message = short_error_message(err);
            emit(
                on_progress,
                Progress::RetryBackoff {
                    url: label.to_string(),
                    attempt: current_attempt,
                    delay_ms: dur.as_millis() as u64,
                    error: message.clone(),
                },
            );
            tracing::warn!(
                "Attempt {} for {} failed, retrying in {:?}: {}",
                current_attempt,
                label,
                dur,
                message
            );
        })
        .when(|e| is_transient(e))
        .await
}
