//! Bounded retries around a single fetch attempt.
//!
//! A [`RetryPolicy`] runs one unit of work up to [`MAX_ATTEMPTS`] times. A
//! [`RetryPredicate`] decides which failures earn another attempt; the
//! default only retries transport errors. A [`Backoff`] decides how long to
//! wait in between, unless the server told us how long to wait.

use crate::rate_limit::RateLimitConfig;
use crate::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Attempts allowed for one page fetch, first attempt included.
pub const MAX_ATTEMPTS: usize = 10;

/// Delay between attempts.
///
/// # Examples
///
/// ```
/// use gizmo_client::Backoff;
/// use std::time::Duration;
///
/// // Back-to-back retries
/// let none = Backoff::None;
///
/// // 100ms, 200ms, 400ms, ... capped at 5s
/// let exponential = Backoff::Exponential {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(5),
///     jitter: true,
/// };
///
/// // 1s between every attempt
/// let linear = Backoff::Linear { delay: Duration::from_secs(1) };
/// ```
#[derive(Debug, Clone, Default)]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,

    /// Wait the same delay before every retry.
    Linear {
        /// The delay between attempts.
        delay: Duration,
    },

    /// Wait `initial_delay * 2^(retry - 1)`, capped at `max_delay`.
    Exponential {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// Scale each delay by a random factor in `[0.5, 1.0]`.
        jitter: bool,
    },

    /// Delay computed from the retry number (1 = first retry).
    Custom {
        /// Returns the delay before the given retry.
        delay_fn: fn(retry: usize) -> Duration,
    },
}

impl Backoff {
    /// Returns the delay before the given retry (1-indexed).
    pub fn delay_for_retry(&self, retry: usize) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Linear { delay } => *delay,
            Backoff::Exponential {
                initial_delay,
                max_delay,
                jitter,
            } => {
                let multiplier = 2u32.saturating_pow(retry.saturating_sub(1) as u32);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    delay.mul_f64(rand::thread_rng().gen_range(0.5..=1.0))
                } else {
                    delay
                }
            }
            Backoff::Custom { delay_fn } => delay_fn(retry),
        }
    }
}

/// Decides whether a failed attempt should be retried.
///
/// The attempt ceiling is enforced by [`RetryPolicy`] regardless of what a
/// predicate answers.
///
/// # Examples
///
/// ```
/// use gizmo_client::{Error, RetryPredicate};
///
/// struct RetryOnGatewayErrors;
///
/// impl RetryPredicate for RetryOnGatewayErrors {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         matches!(error.status().map(|s| s.as_u16()), Some(502..=504))
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if `error`, raised by attempt number `attempt`
    /// (1-indexed), should be retried.
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retries transport errors of any kind. The default.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTransport;

impl RetryPredicate for RetryOnTransport {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable()
    }
}

/// Retries transport errors except 4xx responses other than 429.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnServerError;

impl RetryPredicate for RetryOnServerError {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        match error.status() {
            Some(status) if status.is_client_error() => status.as_u16() == 429,
            _ => error.is_retryable(),
        }
    }
}

/// Retries transport errors and API-level `result_ok = false` answers.
///
/// Useful against endpoints that intermittently decline under load.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnApiFailure;

impl RetryPredicate for RetryOnApiFailure {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_retryable() || matches!(error, Error::Api { .. })
    }
}

/// A value produced by [`RetryPolicy::run`], with the attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    /// The successful result.
    pub value: T,
    /// Attempts made, the successful one included.
    pub attempts: usize,
}

/// Runs a unit of work under the retry budget.
pub struct RetryPolicy {
    backoff: Backoff,
    predicate: Box<dyn RetryPredicate>,
    rate_limit: RateLimitConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Backoff::None,
            Box::new(RetryOnTransport),
            RateLimitConfig::default(),
        )
    }
}

impl RetryPolicy {
    /// Creates a policy from its parts.
    pub fn new(
        backoff: Backoff,
        predicate: Box<dyn RetryPredicate>,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            backoff,
            predicate,
            rate_limit,
        }
    }

    /// Runs `attempt_fn` until it succeeds, fails with an error the predicate
    /// declines to retry, or has been called [`MAX_ATTEMPTS`] times.
    ///
    /// `attempt_fn` receives the 1-indexed attempt number. `url` must already
    /// be redacted; it is only used for logging.
    ///
    /// # Errors
    ///
    /// Non-retryable errors are returned unchanged. A retryable error on the
    /// last attempt is wrapped in [`Error::MaxRetriesExceeded`].
    pub async fn run<T, F, Fut>(&self, url: &str, mut attempt_fn: F) -> Result<Attempted<T>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match attempt_fn(attempt).await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    })
                }
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                url = %url,
                status = ?error.status().map(|s| s.as_u16()),
                "Request failed"
            );

            if !self.predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            if attempt >= MAX_ATTEMPTS {
                tracing::error!(attempts = attempt, url = %url, "Retry budget exhausted");
                return Err(Error::MaxRetriesExceeded {
                    attempts: attempt,
                    last_error: Box::new(error),
                });
            }

            let delay = self.delay_after(&error, attempt);
            if !delay.is_zero() {
                tracing::info!(
                    delay_ms = delay.as_millis(),
                    attempt = attempt,
                    "Retrying request after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Server-indicated waits win over the backoff when enabled.
    fn delay_after(&self, error: &Error, attempt: usize) -> Duration {
        if self.rate_limit.enabled {
            if let Some(delay) = error.rate_limit_delay(self.rate_limit.max_wait) {
                tracing::info!(
                    rate_limit_delay_ms = delay.as_millis(),
                    max_wait_secs = self.rate_limit.max_wait.as_secs(),
                    "Rate limited - waiting before retry"
                );
                return delay;
            }
        }
        self.backoff.delay_for_retry(attempt)
    }
}
