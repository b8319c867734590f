//! Retry policy with exponential backoff and jitter.
//!
//! The policy is an immutable value owned by the client. The default is
//! 3 retries (4 attempts) with exponential backoff 500ms, 1s, 2s (capped at
//! 4s) and +/- 50% jitter, so the total backoff sleep stays below 5.25s.

use rand::Rng;
use std::time::Duration;

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed { delay: Duration },
    /// `base * factor^retry`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(4),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `retry` (0-based).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let seconds = base.as_secs_f64() * factor.powi(retry as i32);
                let delay = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));
                if !jitter {
                    return delay;
                }
                let spread = delay.as_millis() as u64 / 2;
                let offset = rand::rng().random_range(0..=spread * 2);
                Duration::from_millis((delay.as_millis() as u64 + offset).saturating_sub(spread))
            }
        }
    }

    /// Upper bound on a single backoff sleep.
    fn max_delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let seconds = base.as_secs_f64() * factor.powi(retry as i32);
                let capped = seconds.min(max.as_secs_f64());
                let bound = if jitter { capped * 1.5 } else { capped };
                Duration::from_secs_f64(bound)
            }
        }
    }
}

/// Status codes worth another attempt: any 5xx and 429.
pub fn is_transient_status(status: u16) -> bool {
    status >= 500 || status == 429
}

/// Retry policy for upstream fetches.
///
/// Transport failures (connect, timeout, body read) are always retried;
/// HTTP statuses are retried when `retryable_status` says so.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retryable_status: fn(u16) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
            retryable_status: is_transient_status,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff with the default timings.
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Fixed delay between attempts.
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO, 0)
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        (self.retryable_status)(status)
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }

    /// Worst-case total time spent sleeping between attempts.
    pub fn max_total_backoff(&self) -> Duration {
        (0..self.max_retries).map(|r| self.backoff.max_delay(r)).sum()
    }
}
