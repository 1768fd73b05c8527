//! Exponential backoff for transient provider failures
//!
//! Retries live at the provider boundary only. Guardrails and routing never
//! retry on their own.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Ceiling for any single delay
    pub max_delay: Duration,
    /// Growth factor applied after each retry
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Mutable retry state for one logical operation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
    next_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(config: RetryConfig) -> Self {
        Self {
            next_delay: config.initial_delay,
            config,
            attempt: 0,
        }
    }

    /// Check if another retry is allowed
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_retries
    }

    /// Number of retries already performed
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay to wait before the next retry; advances the backoff
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next_delay;
        self.attempt += 1;
        self.next_delay = Duration::from_secs_f32(
            (self.next_delay.as_secs_f32() * self.config.backoff_multiplier)
                .min(self.config.max_delay.as_secs_f32()),
        );
        delay
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out
pub async fn retry_async<F, Fut, T>(mut operation: F, config: &RetryConfig) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut policy = RetryPolicy::new(config.clone());
    loop {
        match operation().await {
            Ok(value) => {
                if policy.attempt() > 0 {
                    debug!(attempts = policy.attempt() + 1, "operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(error) => {
                if !error.is_transient() {
                    return Err(error);
                }
                if !policy.should_retry() {
                    warn!(
                        max_retries = config.max_retries,
                        error = %error,
                        "retries exhausted"
                    );
                    return Err(exhausted(error, config.max_retries));
                }
                let delay = policy.next_delay();
                warn!(
                    attempt = policy.attempt(),
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient provider failure, backing off"
                );
                sleep(delay).await;
            }
        }
    }
}

fn exhausted(error: Error, max_retries: u32) -> Error {
    if max_retries == 0 {
        return error;
    }
    match error {
        Error::Provider { message, status } => Error::Provider {
            message: format!("{} (after {} retries)", message, max_retries),
            status,
        },
        other => other,
    }
}
