//! # CityPulse Resilience
//!
//! The protective layer between the tools and the outside world: a
//! token-bucket [`RateLimiter`] with one budget per provider, and a
//! [`RetryExecutor`] that runs an operation with bounded exponential
//! backoff. Every retry attempt passes through the limiter first, so
//! retries can never bypass a provider's budget.
//!
//! Nothing in this crate holds a lock across an await point; waits are
//! plain `tokio::time::sleep` calls, which keeps every execution
//! cancellable by wrapping it in `tokio::time::timeout` one layer up.

pub mod limiter;
pub mod retry;

pub use limiter::{Admission, BudgetSpec, RateLimitExceeded, RateLimiter};
pub use retry::{RetryError, RetryExecutor, RetryPolicy};
