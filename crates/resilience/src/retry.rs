//! Retry with bounded exponential backoff.
//!
//! The executor owns the resilience pipeline for one outbound operation:
//! limiter admission, the attempt itself, and the backoff sleep. Because
//! admission happens inside the attempt loop, retries draw from the same
//! provider budget as first attempts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use citypulse_core::error::{AdapterError, ToolError};

use crate::limiter::{RateLimitExceeded, RateLimiter};

/// How many times to try and how long to back off in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. Never zero.
    pub max_attempts: u32,

    /// Backoff after the first failed attempt.
    pub base_delay: Duration,

    /// Growth factor applied per subsequent failure.
    pub multiplier: f64,

    /// Ceiling on any single backoff sleep.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier,
            max_delay,
        }
    }

    /// Backoff to sleep after the given 1-based attempt fails:
    /// `base_delay * multiplier^(attempt - 1)`, capped at `max_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30);
        let factor = self.multiplier.powi(exponent as i32);
        let delay = self.base_delay.mul_f64(factor.max(0.0));
        delay.min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Why a resilient execution gave up.
#[derive(Debug, Error)]
pub enum RetryError {
    /// The provider budget would not admit the call in time.
    #[error(transparent)]
    RateLimited(#[from] RateLimitExceeded),

    /// The error does not get better with retries; no further attempts
    /// were made.
    #[error("non-retryable failure on attempt {attempts}: {source}")]
    Fatal { attempts: u32, source: AdapterError },

    /// Every attempt failed with a retryable error.
    #[error("all {attempts} attempts failed: {source}")]
    Exhausted { attempts: u32, source: AdapterError },
}

impl RetryError {
    /// The underlying provider error, when one exists.
    pub fn source_error(&self) -> Option<&AdapterError> {
        match self {
            RetryError::RateLimited(_) => None,
            RetryError::Fatal { source, .. } | RetryError::Exhausted { source, .. } => {
                Some(source)
            }
        }
    }

    /// Surface the give-up reason as a tool error for the invocation layer.
    pub fn into_tool_error(self, tool_name: &str) -> ToolError {
        match self {
            RetryError::RateLimited(limited) => ToolError::RateLimitExceeded {
                provider: limited.provider,
            },
            RetryError::Fatal { source, .. } => ToolError::Adapter(source),
            RetryError::Exhausted { attempts, source } => ToolError::Exhausted {
                tool_name: tool_name.to_string(),
                attempts,
                source,
            },
        }
    }
}

/// Runs operations under a shared rate limiter with per-policy backoff.
///
/// Cheap to clone; clones share the limiter.
#[derive(Clone)]
pub struct RetryExecutor {
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(limiter: Arc<RateLimiter>, policy: RetryPolicy) -> Self {
        Self { limiter, policy }
    }

    /// Same limiter, different backoff schedule.
    pub fn with_policy(&self, policy: RetryPolicy) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run `op` until it succeeds, fails non-retryably, or attempts run
    /// out. Each attempt acquires a token for `provider` first. All waits
    /// are tokio sleeps, so wrapping the returned future in
    /// `tokio::time::timeout` cancels cleanly mid-backoff.
    pub async fn execute<T, F, Fut>(&self, provider: &str, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AdapterError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            self.limiter.acquire(provider).await?;

            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(provider, attempt, "attempt succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => {
                    debug!(provider, attempt, error = %err, "non-retryable failure");
                    return Err(RetryError::Fatal {
                        attempts: attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    if attempt >= self.policy.max_attempts {
                        warn!(
                            provider,
                            attempts = attempt,
                            error = %err,
                            "retries exhausted"
                        );
                        return Err(RetryError::Exhausted {
                            attempts: attempt,
                            source: err,
                        });
                    }
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        provider,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
