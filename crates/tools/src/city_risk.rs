//! The composite risk tool: weather plus news fused into one verdict.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use citypulse_core::adapter::{NewsAdapter, WeatherAdapter};
use citypulse_core::error::{AdapterError, ToolError};
use citypulse_core::news::NewsQuery;
use citypulse_core::risk::RiskVerdict;
use citypulse_core::tool::Tool;
use citypulse_core::weather::{Horizon, WeatherQuery};
use citypulse_resilience::RetryExecutor;
use citypulse_risk::{classify, derive_hazards};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::news::recent_top;

pub const CITY_RISK_TOOL_NAME: &str = "city_risk_tool";

#[derive(Debug, Deserialize)]
struct CityRiskArgs {
    city: String,
    #[serde(default)]
    horizon: Option<String>,
    #[serde(default)]
    activity: Option<String>,
}

/// Fetches weather and headlines for a city and classifies the combined
/// risk. The weather fetch is load-bearing; a news failure degrades to an
/// empty headline list so a flaky news provider cannot sink the whole
/// assessment.
pub struct CityRiskTool {
    weather: Arc<dyn WeatherAdapter>,
    news: Arc<dyn NewsAdapter>,
    executor: RetryExecutor,
}

impl CityRiskTool {
    pub fn new(
        weather: Arc<dyn WeatherAdapter>,
        news: Arc<dyn NewsAdapter>,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            weather,
            news,
            executor,
        }
    }
}

fn build_assessment(verdict: &RiskVerdict, activity: Option<&str>) -> String {
    let mut message = format!("Risk level: {}.", verdict.category.label());
    if !verdict.contributing_factors.is_empty() {
        let factors: Vec<&str> = verdict
            .contributing_factors
            .iter()
            .map(String::as_str)
            .collect();
        message.push_str(&format!(" Key factors: {}.", factors.join("; ")));
    }
    if let Some(activity) = activity {
        message.push_str(&format!(" Activity: {activity}."));
    }
    message
}

#[async_trait]
impl Tool for CityRiskTool {
    fn name(&self) -> &str {
        CITY_RISK_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Assess the overall risk level for a city by combining the weather \
         forecast with recent news. Optionally considers a planned activity."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "City name, e.g. 'Cebu City'"
                },
                "horizon": {
                    "type": "string",
                    "description": "Time horizon, e.g. 'today' or 'tomorrow' (default: today)"
                },
                "activity": {
                    "type": "string",
                    "description": "Planned activity to mention in the assessment, e.g. 'hiking'"
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
                "place_label": { "type": "string" },
                "verdict": { "type": "object" },
                "assessment": { "type": "string" }
            },
            "required": ["city", "verdict", "assessment"]
        })
    }

    fn provider_id(&self) -> &str {
        self.weather.provider_id()
    }

    async fn run(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let args: CityRiskArgs =
            serde_json::from_value(arguments).map_err(|e| ToolError::Schema {
                tool_name: CITY_RISK_TOOL_NAME.to_string(),
                reason: e.to_string(),
            })?;

        let horizon = Horizon::parse(args.horizon.as_deref().unwrap_or_default());
        let weather_query = WeatherQuery::new(args.city.clone(), horizon);
        let snapshot = self
            .executor
            .execute(self.weather.provider_id(), || {
                self.weather.fetch(&weather_query)
            })
            .await
            .map_err(|e| e.into_tool_error(CITY_RISK_TOOL_NAME))?;

        let news_query = NewsQuery::new(args.city.clone());
        let headlines = match self
            .executor
            .execute(self.news.provider_id(), || self.news.fetch(&news_query))
            .await
        {
            Ok(headlines) => recent_top(headlines, Utc::now()),
            Err(err) => {
                warn!(city = %args.city, error = %err, "news unavailable, assessing weather only");
                Vec::new()
            }
        };

        let hazards = derive_hazards(&snapshot);
        let verdict = classify(&hazards, &headlines);
        let assessment = build_assessment(&verdict, args.activity.as_deref());

        let verdict_json = serde_json::to_value(&verdict).map_err(|e| {
            ToolError::Adapter(AdapterError::InvalidResponse(format!(
                "serializing verdict: {e}"
            )))
        })?;

        let mut payload = json!({
            "city": args.city,
            "place_label": snapshot.place_label,
            "verdict": verdict_json,
            "assessment": assessment,
            "headlines_considered": headlines.len(),
        });
        if let Some(activity) = args.activity {
            payload["activity"] = json!(activity);
        }
        Ok(payload)
    }
}
