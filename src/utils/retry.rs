//! Retry utilities for resilient operations
//!
//! This module provides a bounded retry mechanism with exponential backoff,
//! used by the extraction engine around page navigation.

use futures::future::BoxFuture;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (the first attempt is not a retry)
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff (default: 2.0)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom max retries
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a retry configuration with custom delays
    pub fn with_delays(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            backoff_multiplier: 2.0,
        }
    }

    /// Total number of attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate delay for a given attempt using exponential backoff
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let exponential =
                self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
            (exponential as u64).min(self.max_delay_ms)
        };

        Duration::from_millis(delay_ms)
    }
}

/// Outcome of a retried operation that never succeeded
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Number of attempts actually made
    pub attempts: u32,

    /// Error returned by the last attempt
    pub last_error: E,
}

/// Execute an operation against `state` with retry logic and exponential backoff
///
/// The operation receives a fresh mutable borrow of `state` on every attempt,
/// which lets callers retry methods of a stateful handle (a browser tab, a
/// connection). Errors for which `should_retry` returns `false` end the loop
/// immediately.
///
/// # Example
///
/// ```no_run
/// use revharvest::utils::retry::{with_retry_if, RetryConfig};
/// use revharvest::utils::error::RenderError;
///
/// struct Tab;
///
/// impl Tab {
///     async fn reload(&mut self) -> Result<(), RenderError> {
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let mut tab = Tab;
///     let config = RetryConfig::default();
///     let result = with_retry_if(
///         &config,
///         &mut tab,
///         |tab| Box::pin(tab.reload()),
///         RenderError::is_recoverable,
///     )
///     .await;
///     assert!(result.is_ok());
/// }
/// ```
pub async fn with_retry_if<S, T, E, F, P>(
    config: &RetryConfig,
    state: &mut S,
    mut operation: F,
    should_retry: P,
) -> Result<T, RetryFailure<E>>
where
    S: ?Sized,
    E: Display,
    F: for<'a> FnMut(&'a mut S) -> BoxFuture<'a, Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = config.calculate_delay(attempt);
            debug!(
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retrying operation after delay"
            );
            tokio::time::sleep(delay).await;
        }

        match operation(state).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    warn!(error = %e, "Non-retryable error encountered");
                    return Err(RetryFailure {
                        attempts: attempt + 1,
                        last_error: e,
                    });
                }

                warn!(
                    attempt = attempt,
                    max_retries = config.max_retries,
                    error = %e,
                    "Operation failed"
                );

                if attempt >= config.max_retries {
                    return Err(RetryFailure {
                        attempts: attempt + 1,
                        last_error: e,
                    });
                }
            }
        }

        attempt += 1;
    }
}
