//! Adapter traits, the seams to the external data providers.
//!
//! Adapters do the raw fetch-and-parse for one provider and nothing else.
//! Rate limiting, retries, and deadlines live a layer up in the tools, so
//! an adapter failure is a plain `AdapterError` that the resilience layer
//! can inspect for retryability.

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::news::{Headline, NewsQuery};
use crate::weather::{WeatherQuery, WeatherSnapshot};

/// A provider that answers weather queries for a city.
#[async_trait]
pub trait WeatherAdapter: Send + Sync {
    /// Rate-limit identity (e.g., "open-meteo", "openweather").
    fn provider_id(&self) -> &str;

    async fn fetch(
        &self,
        query: &WeatherQuery,
    ) -> std::result::Result<WeatherSnapshot, AdapterError>;
}

/// A provider that returns dated headlines for a city.
///
/// Implementations return every parseable-dated item they got, newest
/// ordering not required; recency filtering and truncation are the news
/// tool's job.
#[async_trait]
pub trait NewsAdapter: Send + Sync {
    /// Rate-limit identity (e.g., "serpapi").
    fn provider_id(&self) -> &str;

    async fn fetch(
        &self,
        query: &NewsQuery,
    ) -> std::result::Result<Vec<Headline>, AdapterError>;
}
