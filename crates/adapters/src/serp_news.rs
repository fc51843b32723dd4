//! SerpAPI Google News adapter.
//!
//! Fetches the Google News results for a city through SerpAPI, pinned to
//! the regional edition for the city's country (resolved on the fly when
//! the query does not carry a locale). Result dates arrive in a handful of
//! formats; items whose date cannot be normalized are dropped rather than
//! guessed, so every returned [`Headline`] has a real timestamp. Recency
//! filtering and truncation happen in the news tool, not here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use citypulse_core::adapter::NewsAdapter;
use citypulse_core::error::AdapterError;
use citypulse_core::news::{Headline, NewsQuery};
use serde::Deserialize;
use tracing::debug;

use crate::dates::parse_published_at;
use crate::http;
use crate::locale::CountryResolver;

pub struct SerpNewsAdapter {
    search_url: String,
    api_key: String,
    resolver: CountryResolver,
    client: reqwest::Client,
}

impl SerpNewsAdapter {
    pub fn new(
        search_url: impl Into<String>,
        api_key: impl Into<String>,
        resolver: CountryResolver,
    ) -> Self {
        Self {
            search_url: search_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            resolver,
            client: http::client(),
        }
    }

    fn headlines_from(body: ApiSearchResponse, now: DateTime<Utc>) -> Vec<Headline> {
        // Some queries come back under organic_results instead.
        let items = match body.news_results {
            Some(items) if !items.is_empty() => items,
            _ => body.organic_results.unwrap_or_default(),
        };

        let mut headlines = Vec::with_capacity(items.len());
        for item in items {
            let raw_date = item.date.or(item.published).unwrap_or_default();
            let Some(published_at) = parse_published_at(&raw_date, now) else {
                debug!(date = %raw_date, "dropping item with unparseable date");
                continue;
            };

            let title = item.title.unwrap_or_else(|| "Untitled".to_string());
            let mut headline = Headline::new(title, published_at);
            if let Some(source) = item.source.and_then(ApiSource::into_name) {
                headline = headline.with_source(source);
            }
            if let Some(link) = item.link {
                headline = headline.with_link(link);
            }
            if let Some(snippet) = item.snippet {
                headline = headline.with_snippet(snippet);
            }
            headlines.push(headline);
        }
        headlines
    }
}

#[async_trait]
impl NewsAdapter for SerpNewsAdapter {
    fn provider_id(&self) -> &str {
        "serpapi"
    }

    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<Headline>, AdapterError> {
        if self.api_key.is_empty() {
            return Err(AdapterError::NotConfigured("SERPAPI_API_KEY".into()));
        }

        let locale = match &query.locale {
            Some(locale) => locale.clone(),
            None => self.resolver.country_code(&query.city).await,
        };

        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("engine", "google_news"),
                ("q", query.city.as_str()),
                ("hl", "en"),
                ("gl", locale.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(http::request_error)?;

        let body: ApiSearchResponse = http::read_json(response, "news search").await?;
        Ok(Self::headlines_from(body, Utc::now()))
    }
}

// --- SerpAPI types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    news_results: Option<Vec<ApiNewsItem>>,
    organic_results: Option<Vec<ApiNewsItem>>,
}

#[derive(Debug, Deserialize)]
struct ApiNewsItem {
    title: Option<String>,
    source: Option<ApiSource>,
    date: Option<String>,
    published: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

/// The source field is an object on news_results and a bare string on
/// organic_results.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiSource {
    Named { name: Option<String> },
    Plain(String),
}

impl ApiSource {
    fn into_name(self) -> Option<String> {
        match self {
            ApiSource::Named { name } => name,
            ApiSource::Plain(name) => Some(name),
        }
    }
}
