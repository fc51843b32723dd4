//! The news tool: recent headlines for a city, filtered and ranked.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use citypulse_core::adapter::NewsAdapter;
use citypulse_core::error::ToolError;
use citypulse_core::news::{Headline, NewsQuery};
use citypulse_core::tool::Tool;
use citypulse_resilience::RetryExecutor;
use serde::Deserialize;
use serde_json::json;

pub const NEWS_TOOL_NAME: &str = "news_tool";

/// Headlines older than this are dropped.
const RECENCY_DAYS: i64 = 7;

/// How many headlines survive ranking.
const MAX_HEADLINES: usize = 3;

#[derive(Debug, Deserialize)]
struct NewsArgs {
    city: String,
}

/// Fetches headlines for a city and keeps the freshest few.
pub struct NewsTool {
    adapter: Arc<dyn NewsAdapter>,
    executor: RetryExecutor,
}

impl NewsTool {
    pub fn new(adapter: Arc<dyn NewsAdapter>, executor: RetryExecutor) -> Self {
        Self { adapter, executor }
    }
}

/// Keeps headlines from the last `RECENCY_DAYS` days (cutoff inclusive),
/// newest first, truncated to `MAX_HEADLINES`.
pub(crate) fn recent_top(mut headlines: Vec<Headline>, now: DateTime<Utc>) -> Vec<Headline> {
    let cutoff = now - ChronoDuration::days(RECENCY_DAYS);
    headlines.retain(|h| h.published_at >= cutoff);
    headlines.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    headlines.truncate(MAX_HEADLINES);
    headlines
}

#[async_trait]
impl Tool for NewsTool {
    fn name(&self) -> &str {
        NEWS_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get up to three recent news headlines about a city, newest first, \
         limited to the past week."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name, e.g. 'Cebu City'"
                }
            },
            "required": ["city"]
        })
    }

    fn output_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string" },
                "headlines": { "type": "array" },
                "count": { "type": "number" }
            },
            "required": ["city", "headlines", "count"]
        })
    }

    fn provider_id(&self) -> &str {
        self.adapter.provider_id()
    }

    async fn run(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let args: NewsArgs = serde_json::from_value(arguments).map_err(|e| ToolError::Schema {
            tool_name: NEWS_TOOL_NAME.to_string(),
            reason: e.to_string(),
        })?;

        let query = NewsQuery::new(args.city.clone());
        let headlines = self
            .executor
            .execute(self.adapter.provider_id(), || self.adapter.fetch(&query))
            .await
            .map_err(|e| e.into_tool_error(NEWS_TOOL_NAME))?;

        let headlines = recent_top(headlines, Utc::now());
        Ok(json!({
            "city": args.city,
            "count": headlines.len(),
            "headlines": headlines,
        }))
    }
}
