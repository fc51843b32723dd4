//! Built-in tool implementations for CityPulse.
//!
//! Three tools give the agent its view of a city: the weather forecast,
//! recent headlines, and a fused risk assessment. Every tool routes its
//! provider calls through a shared [`RetryExecutor`], so rate budgets and
//! backoff apply uniformly no matter which tool triggered the fetch.
//!
//! The [`ToolRegistry`] is the only entry point the reasoning loop uses:
//! it validates arguments against the tool's schema before any network
//! I/O, enforces the per-invocation deadline, and normalizes every
//! outcome into a [`ToolResult`] observation.

pub mod city_risk;
pub mod news;
pub mod registry;
pub mod weather;

mod schema;

use std::sync::Arc;
use std::time::Duration;

use citypulse_core::adapter::{NewsAdapter, WeatherAdapter};
use citypulse_resilience::RetryExecutor;

pub use city_risk::CityRiskTool;
pub use news::NewsTool;
pub use registry::ToolRegistry;
pub use weather::WeatherTool;

/// Create a registry with all built-in tools wired to the given adapters.
///
/// The executor is cloned per tool; clones share the same rate limiter,
/// so the weather and risk tools draw from one weather budget.
pub fn standard_registry(
    weather: Arc<dyn WeatherAdapter>,
    news: Arc<dyn NewsAdapter>,
    executor: RetryExecutor,
    step_timeout: Duration,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new(step_timeout);
    registry.register(Box::new(WeatherTool::new(
        Arc::clone(&weather),
        executor.clone(),
    )));
    registry.register(Box::new(NewsTool::new(Arc::clone(&news), executor.clone())));
    registry.register(Box::new(CityRiskTool::new(weather, news, executor)));
    registry
}
