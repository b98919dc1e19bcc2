//! Retry policy for webhook delivery
//!
//! Exponential backoff with optional full jitter. Without an attempt cap the
//! dispatcher keeps retrying until the endpoint accepts the payload.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay after the first rejected attempt
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Randomise each delay uniformly in `[0, delay]`
    pub jitter: bool,
    /// Give up (dead-letter) after this many attempts; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Tight retry loop with no delay and no cap
    pub fn immediate() -> Self {
        Self {
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
            jitter: false,
            max_attempts: None,
        }
    }

    /// Delay to wait after `failed_attempts` consecutive rejections (1-based)
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(63) as i32;
        let base_ms = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped_ms = base_ms.min(self.max_backoff.as_millis() as f64).max(0.0) as u64;

        if self.jitter && capped_ms > 0 {
            Duration::from_millis(rand::thread_rng().gen_range(0..=capped_ms))
        } else {
            Duration::from_millis(capped_ms)
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made
    pub fn allows_another(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts < max,
            None => true,
        }
    }
}

/// Attempt counter step; an uncapped policy may retry past `u32::MAX`
pub fn next_attempt(attempts: u32) -> u32 {
    attempts.saturating_add(1)
}
