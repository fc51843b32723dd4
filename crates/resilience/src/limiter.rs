//! Token-bucket rate limiter with one budget per provider.
//!
//! Each provider id ("open-meteo", "serpapi", ...) owns an independent
//! bucket. Tokens refill continuously in proportion to elapsed time,
//! capped at the bucket's capacity; an admission consumes exactly one
//! token. The bucket map sits behind a single `std::sync::Mutex` that is
//! only ever held for the refill arithmetic; callers that need to wait
//! do so outside the lock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Capacity and refill rate for one provider's bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSpec {
    /// Maximum burst size; also the starting token count.
    pub capacity: f64,

    /// Tokens added per second of elapsed time.
    pub refill_per_sec: f64,
}

impl BudgetSpec {
    pub fn new(capacity: f64, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            refill_per_sec,
        }
    }
}

impl Default for BudgetSpec {
    fn default() -> Self {
        // One call per second with a small burst; deliberately conservative
        // for providers that were never given an explicit budget.
        Self::new(2.0, 1.0)
    }
}

/// A provider's live bucket state. Owned exclusively by the limiter.
#[derive(Debug)]
struct RateBudget {
    spec: BudgetSpec,
    tokens: f64,
    last_refill: Instant,
}

impl RateBudget {
    fn new(spec: BudgetSpec, now: Instant) -> Self {
        Self {
            spec,
            tokens: spec.capacity,
            last_refill: now,
        }
    }

    /// Credit tokens for the time since the last refill, capped at capacity.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.last_refill = now;
        self.tokens =
            (self.tokens + elapsed.as_secs_f64() * self.spec.refill_per_sec).min(self.spec.capacity);
    }

    /// Consume one token if available, otherwise report how long until one
    /// will have refilled.
    fn admit(&mut self, now: Instant) -> Admission {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Admission::Admitted
        } else if self.spec.refill_per_sec > 0.0 {
            let deficit = 1.0 - self.tokens;
            Admission::MustWait(Duration::from_secs_f64(deficit / self.spec.refill_per_sec))
        } else {
            // A zero refill rate never recovers; surface an effectively
            // unbounded wait so acquire() fails its budget check.
            Admission::MustWait(Duration::MAX)
        }
    }
}

/// The outcome of a non-blocking admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A token was consumed; the call may proceed now.
    Admitted,

    /// No token available; one will have refilled after this long.
    MustWait(Duration),
}

/// Returned by [`RateLimiter::acquire`] when the bounded wait elapsed
/// without an admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate budget for {provider} not admitted within {max_wait_ms}ms")]
pub struct RateLimitExceeded {
    pub provider: String,
    pub max_wait_ms: u64,
}

/// Token-bucket limiter shared by every concurrent request.
pub struct RateLimiter {
    budgets: Mutex<HashMap<String, RateBudget>>,
    specs: HashMap<String, BudgetSpec>,
    default_spec: BudgetSpec,
    max_wait: Duration,
}

impl RateLimiter {
    /// Create a limiter that gives unknown providers `default_spec` and
    /// lets `acquire` wait at most `max_wait` before giving up.
    pub fn new(default_spec: BudgetSpec, max_wait: Duration) -> Self {
        Self {
            budgets: Mutex::new(HashMap::new()),
            specs: HashMap::new(),
            default_spec,
            max_wait,
        }
    }

    /// Register an explicit budget for one provider.
    pub fn with_budget(mut self, provider: impl Into<String>, spec: BudgetSpec) -> Self {
        self.specs.insert(provider.into(), spec);
        self
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Non-blocking admission check. Consumes a token when one is
    /// available, otherwise reports the wait until the next token.
    pub fn try_acquire(&self, provider: &str) -> Admission {
        let now = Instant::now();
        let mut budgets = self.budgets.lock().unwrap_or_else(|e| e.into_inner());
        let budget = budgets.entry(provider.to_string()).or_insert_with(|| {
            let spec = self
                .specs
                .get(provider)
                .copied()
                .unwrap_or(self.default_spec);
            RateBudget::new(spec, now)
        });
        budget.admit(now)
    }

    /// Wait for an admission, sleeping between checks, for at most the
    /// limiter's `max_wait`. A needed wait that already exceeds the
    /// remaining allowance fails immediately rather than sleeping first.
    pub async fn acquire(&self, provider: &str) -> Result<(), RateLimitExceeded> {
        let deadline = Instant::now() + self.max_wait;
        loop {
            match self.try_acquire(provider) {
                Admission::Admitted => return Ok(()),
                Admission::MustWait(wait) => {
                    let now = Instant::now();
                    let remaining = deadline.saturating_duration_since(now);
                    if wait > remaining {
                        debug!(
                            provider,
                            wait_ms = wait.as_millis() as u64,
                            max_wait_ms = self.max_wait.as_millis() as u64,
                            "rate budget exhausted"
                        );
                        return Err(RateLimitExceeded {
                            provider: provider.to_string(),
                            max_wait_ms: self.max_wait.as_millis() as u64,
                        });
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Current token count for a provider. Reads through the same refill
    /// path as an admission, without consuming anything.
    pub fn available(&self, provider: &str) -> f64 {
        let now = Instant::now();
        let mut budgets = self.budgets.lock().unwrap_or_else(|e| e.into_inner());
        match budgets.get_mut(provider) {
            Some(budget) => {
                budget.refill(now);
                budget.tokens
            }
            None => self
                .specs
                .get(provider)
                .copied()
                .unwrap_or(self.default_spec)
                .capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(capacity: f64, refill_per_sec: f64) -> RateLimiter {
        RateLimiter::new(BudgetSpec::default(), Duration::from_secs(2))
            .with_budget("test", BudgetSpec::new(capacity, refill_per_sec))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_admits_up_to_capacity() {
        let limiter = limiter(5.0, 1.0);
        let mut admitted = 0;
        for _ in 0..8 {
            if limiter.try_acquire("test") == Admission::Admitted {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 5);
        assert!(limiter.available("test") >= 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_never_exceed_capacity() {
        let limiter = limiter(3.0, 10.0);
        assert_eq!(limiter.try_acquire("test"), Admission::Admitted);

        // Long idle period refills far more than was spent.
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.available("test") <= 3.0);

        let mut admitted = 0;
        for _ in 0..10 {
            if limiter.try_acquire("test") == Admission::Admitted {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn refill_is_proportional_to_elapsed_time() {
        let limiter = limiter(1.0, 1.0);
        assert_eq!(limiter.try_acquire("test"), Admission::Admitted);

        match limiter.try_acquire("test") {
            Admission::MustWait(wait) => {
                assert!((wait.as_secs_f64() - 1.0).abs() < 0.01, "wait was {wait:?}");
            }
            Admission::Admitted => panic!("bucket should be empty"),
        }

        tokio::time::advance(Duration::from_millis(500)).await;
        match limiter.try_acquire("test") {
            Admission::MustWait(wait) => {
                assert!((wait.as_secs_f64() - 0.5).abs() < 0.01, "wait was {wait:?}");
            }
            Admission::Admitted => panic!("only half a token should have refilled"),
        }

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(limiter.try_acquire("test"), Admission::Admitted);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_waits_for_a_token() {
        let limiter = limiter(1.0, 1.0);
        assert_eq!(limiter.try_acquire("test"), Admission::Admitted);

        let started = Instant::now();
        limiter.acquire("test").await.unwrap();
        let waited = started.elapsed();
        assert!(
            (waited.as_secs_f64() - 1.0).abs() < 0.01,
            "waited {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_fails_when_wait_exceeds_budget() {
        // 0.1 tokens/sec means ~10s until the next token; max_wait is 2s.
        let limiter = limiter(1.0, 0.1);
        assert_eq!(limiter.try_acquire("test"), Admission::Admitted);

        let started = Instant::now();
        let err = limiter.acquire("test").await.unwrap_err();
        assert_eq!(err.provider, "test");
        // Failure is immediate: the needed wait is known up front.
        assert!(started.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_provider_gets_the_default_budget() {
        let limiter = RateLimiter::new(BudgetSpec::new(2.0, 1.0), Duration::from_secs(2));
        assert_eq!(limiter.try_acquire("never-configured"), Admission::Admitted);
        assert_eq!(limiter.try_acquire("never-configured"), Admission::Admitted);
        assert!(matches!(
            limiter.try_acquire("never-configured"),
            Admission::MustWait(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn budgets_are_independent_per_provider() {
        let limiter = RateLimiter::new(BudgetSpec::default(), Duration::from_secs(2))
            .with_budget("weather", BudgetSpec::new(1.0, 1.0))
            .with_budget("news", BudgetSpec::new(1.0, 1.0));

        assert_eq!(limiter.try_acquire("weather"), Admission::Admitted);
        assert!(matches!(
            limiter.try_acquire("weather"),
            Admission::MustWait(_)
        ));
        // Draining the weather budget leaves the news budget untouched.
        assert_eq!(limiter.try_acquire("news"), Admission::Admitted);
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_never_go_negative_under_contention() {
        let limiter = std::sync::Arc::new(limiter(2.0, 1.0));
        let mut handles = Vec::new();
        for _ in 0..6 {
            let limiter = std::sync::Arc::clone(&limiter);
            handles.push(tokio::spawn(async move { limiter.try_acquire("test") }));
        }
        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() == Admission::Admitted {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 2);
        assert!(limiter.available("test") >= 0.0);
    }
}
