//! Bounded retry policies for the vector index
//!
//! Two policies are used: a fixed-delay policy while waiting for the index to
//! come up at startup, and a short exponential policy around individual store
//! operations during a crawl. Exhausting either one is reported to the caller,
//! which decides whether that is fatal.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after the given zero-based failed attempt
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => base
                .saturating_mul(2u32.saturating_pow(attempt.min(20)))
                .min(max),
        }
    }
}

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Waiting for the index at process start: 5 attempts, 5 seconds apart
    pub const fn startup() -> Self {
        Self {
            attempts: 5,
            backoff: Backoff::Fixed(Duration::from_secs(5)),
        }
    }

    /// Single store operation mid-crawl: 3 attempts, 500ms doubling, capped at 8s
    pub const fn operation() -> Self {
        Self {
            attempts: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(500),
                max: Duration::from_secs(8),
            },
        }
    }

    /// Single attempt, no waiting
    pub const fn none() -> Self {
        Self {
            attempts: 1,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }

    /// Run `op` until it succeeds or the attempts are used up, returning the
    /// last error in that case
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < attempts => {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt + 1,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
