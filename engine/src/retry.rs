use std::{fmt::Display, time::Duration};

use log::warn;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

/// Bounded attempts with a fixed delay in between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Retries without waiting, mostly useful in tests
    pub const fn immediate(attempts: u32) -> Self {
        Self::new(attempts, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(3))
    }
}

/// The last error of an operation that ran out of attempts
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` until it succeeds or `policy.attempts` is used up.
///
/// A policy with zero attempts still runs the operation once. There is no
/// sleep after the final attempt.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(
                    "{what} failed ({attempt}/{attempts}), retrying in {:?}: {e}",
                    policy.delay
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
            Err(last_error) => {
                return Err(RetryExhausted {
                    attempts,
                    last_error,
                });
            }
        }
    }
}
