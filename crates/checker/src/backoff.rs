//! Bounded retries with exponential delay.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::DEFAULT_ATTEMPTS;

/// Every attempt failed; carries the error of the last one
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Resolve the caller's retry override into an attempt budget.
///
/// A missing override and an explicit `0` both mean "use the default": the
/// inbound request cannot tell the two apart.
pub fn resolve_attempts(retry: Option<u32>) -> u32 {
    match retry {
        None | Some(0) => DEFAULT_ATTEMPTS,
        Some(attempts) => attempts,
    }
}

/// Exponential backoff policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    initial_interval: Duration,
    max_interval: Duration,
    multiplier: f64,
    randomization: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(10))
    }
}

impl Backoff {
    /// Doubling backoff between `initial_interval` and `max_interval`, 50% upward jitter
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        let initial_interval = initial_interval.max(Duration::from_millis(1));
        Self {
            initial_interval,
            max_interval: max_interval.max(initial_interval),
            multiplier: 2.0,
            randomization: 0.5,
        }
    }

    /// Growth factor between delays, clamped to at least 1
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() { multiplier.max(1.0) } else { 1.0 };
        self
    }

    /// Upward jitter as a fraction of the base delay, clamped to `0..=1`
    pub fn with_randomization(mut self, randomization: f64) -> Self {
        self.randomization = if randomization.is_finite() { randomization.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// The delay sequence between attempts: never zero, never decreasing
    pub fn delays(&self) -> Delays {
        Delays {
            policy: *self,
            next_base_ms: self.initial_interval.as_millis() as f64,
            previous: self.initial_interval,
        }
    }

    /// Run `operation` up to `attempts` times, sleeping between failures.
    ///
    /// The closure receives the 1-based attempt number. The first success is
    /// returned immediately. A budget of 0 still makes one attempt.
    pub async fn retry<T, E, F, Fut>(&self, attempts: u32, mut operation: F) -> Result<T, Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = attempts.max(1);
        let mut delays = self.delays();
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= attempts => {
                    warn!(attempts, error = %last, "all attempts failed");
                    return Err(Exhausted { attempts, last });
                }
                Err(error) => {
                    let delay = delays.next().unwrap_or(self.max_interval);
                    debug!(attempt, attempts, %error, ?delay, "attempt failed, backing off");
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Infinite iterator over backoff delays
#[derive(Debug, Clone)]
pub struct Delays {
    policy: Backoff,
    next_base_ms: f64,
    previous: Duration,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let jitter = if self.policy.randomization > 0.0 {
            rand::thread_rng().gen_range(0.0..self.policy.randomization)
        } else {
            0.0
        };

        let candidate = Duration::from_millis((self.next_base_ms * (1.0 + jitter)).round() as u64)
            .min(self.policy.max_interval);
        let delay = candidate.max(self.previous);

        let max_ms = self.policy.max_interval.as_millis() as f64;
        self.next_base_ms = (self.next_base_ms * self.policy.multiplier).min(max_ms);
        self.previous = delay;

        Some(delay)
    }
}
