//! Bounded exponential backoff

use cva_core::{Config, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

/// Upper bound for a single backoff delay
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How many times a transient failure is retried and how long to wait between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts, the first one included
  pub max_attempts: u32,
  /// Delay after the first failure, doubled for every further one
  pub initial_backoff: Duration,
  /// Cap on any single delay
  pub max_backoff: Duration,
}

impl RetryPolicy {
  /// Policy described by the client configuration
  pub fn from_config(config: &Config) -> Self {
    Self {
      max_attempts: config.max_retries.max(1),
      initial_backoff: Duration::from_millis(config.retry_backoff_ms),
      max_backoff: MAX_BACKOFF,
    }
  }

  /// A single attempt, no retries
  pub fn none() -> Self {
    Self { max_attempts: 1, initial_backoff: Duration::ZERO, max_backoff: Duration::ZERO }
  }

  /// Delay to wait after the given failed attempt (1-based)
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
  }

  /// Run `operation` until it succeeds, fails with a non-retryable error, or
  /// the attempts run out.
  pub async fn execute<F, Fut, T>(&self, what: &str, mut operation: F) -> Result<T>
  where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
  {
    let mut attempt = 0;
    loop {
      match operation().await {
        Ok(value) => return Ok(value),
        Err(e) => {
          attempt += 1;
          if !e.is_retryable() || attempt >= self.max_attempts {
            if e.is_retryable() && self.max_attempts > 1 {
              error!("Giving up on {} after {} attempts", what, attempt);
            }
            return Err(e);
          }
          let delay = self.backoff(attempt);
          warn!(
            "Retrying {} in {}ms (attempt {} of {}): {}",
            what,
            delay.as_millis(),
            attempt + 1,
            self.max_attempts,
            e
          );
          sleep(delay).await;
        }
      }
    }
  }
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: cva_core::DEFAULT_MAX_RETRIES,
      initial_backoff: Duration::from_millis(cva_core::DEFAULT_RETRY_BACKOFF_MS),
      max_backoff: MAX_BACKOFF,
    }
  }
}
