//! Bounded retry for network operations.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Default number of attempts, first try included
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first (values below 1 behave as 1)
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_attempts` tries and no pause
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Errors that can tell whether trying again may help
pub trait Transient {
    /// `true` if a later attempt may succeed
    fn is_transient(&self) -> bool;
}

impl Transient for crate::error::UploadAttemptError {
    fn is_transient(&self) -> bool {
        crate::error::UploadAttemptError::is_transient(self)
    }
}

/// Successful result together with the attempt count that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    /// Operation result
    pub value: T,
    /// Attempts made, first try included
    pub attempts: u32,
}

/// Why a retried operation gave up
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts made, first try included
    pub attempts: u32,
    /// Error from the final attempt
    pub error: E,
    /// `true` if the budget ran out, `false` if a non-transient error stopped it
    pub exhausted: bool,
}

/// Run `operation` until it succeeds, fails non-transiently, or the policy's
/// attempt budget is spent.
///
/// `operation` receives the one-based attempt number.
pub async fn retry_with_policy<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
    operation_name: &str,
) -> Result<Attempted<T>, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!(
                        "{} succeeded after {} retry(ies)",
                        operation_name,
                        attempt - 1
                    );
                }
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => {
                if !e.is_transient() {
                    log::error!("{} failed with unrecoverable error: {}", operation_name, e);
                    return Err(RetryFailure {
                        attempts: attempt,
                        error: e,
                        exhausted: false,
                    });
                }

                if attempt >= max_attempts {
                    log::error!(
                        "{} failed after {} attempt(s): {}",
                        operation_name,
                        attempt,
                        e
                    );
                    return Err(RetryFailure {
                        attempts: attempt,
                        error: e,
                        exhausted: true,
                    });
                }

                log::warn!(
                    "{} failed (attempt {}/{}): {}",
                    operation_name,
                    attempt,
                    max_attempts,
                    e
                );

                if !policy.backoff.is_zero() {
                    log::debug!("Retrying in {:.1}s", policy.backoff.as_secs_f64());
                    tokio::time::sleep(policy.backoff).await;
                }
            }
        }
    }
}
