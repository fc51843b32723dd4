//! The weather tool: forecast lookup plus hazard derivation.

use std::sync::Arc;

use async_trait::async_trait;
use citypulse_core::adapter::WeatherAdapter;
use citypulse_core::error::{AdapterError, ToolError};
use citypulse_core::tool::Tool;
use citypulse_core::weather::{Horizon, WeatherQuery};
use citypulse_resilience::RetryExecutor;
use citypulse_risk::derive_hazards;
use serde::Deserialize;
use serde_json::json;

pub const WEATHER_TOOL_NAME: &str = "weather_tool";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
    #[serde(default)]
    horizon: Option<String>,
}

/// Looks up current conditions and the selected day slice, then derives
/// the hazard set the risk layer works from.
pub struct WeatherTool {
    adapter: Arc<dyn WeatherAdapter>,
    executor: RetryExecutor,
}

impl WeatherTool {
    pub fn new(adapter: Arc<dyn WeatherAdapter>, executor: RetryExecutor) -> Self {
        Self { adapter, executor }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get a weather summary for a city: current conditions, the daily \
         outlook for the requested horizon, and any weather hazards."
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
                }
            },
            "required": ["city"]
        })
    }

    fn output_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "place_label": { "type": "string" },
                "current": { "type": "object" },
                "outlook": { "type": "object" },
                "hazards": { "type": "array" }
            },
            "required": ["place_label", "current", "hazards"]
        })
    }

    fn provider_id(&self) -> &str {
        self.adapter.provider_id()
    }

    async fn run(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError> {
        let args: WeatherArgs =
            serde_json::from_value(arguments).map_err(|e| ToolError::Schema {
                tool_name: WEATHER_TOOL_NAME.to_string(),
                reason: e.to_string(),
            })?;

        let horizon = Horizon::parse(args.horizon.as_deref().unwrap_or_default());
        let query = WeatherQuery::new(args.city, horizon);

        let snapshot = self
            .executor
            .execute(self.adapter.provider_id(), || self.adapter.fetch(&query))
            .await
            .map_err(|e| e.into_tool_error(WEATHER_TOOL_NAME))?;

        let hazards = derive_hazards(&snapshot);
        let mut payload = serde_json::to_value(&snapshot).map_err(|e| {
            ToolError::Adapter(AdapterError::InvalidResponse(format!(
                "serializing snapshot: {e}"
            )))
        })?;
        payload["hazards"] = json!(hazards);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citypulse_core::weather::{CurrentConditions, DailyOutlook, WeatherSnapshot};
    use citypulse_resilience::{BudgetSpec, RateLimiter, RetryPolicy};
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedWeather {
        responses: Mutex<Vec<Result<WeatherSnapshot, AdapterError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedWeather {
        fn new(responses: Vec<Result<WeatherSnapshot, AdapterError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl WeatherAdapter for ScriptedWeather {
        fn provider_id(&self) -> &str {
            "open-meteo"
        }

        async fn fetch(
            &self,
            _query: &WeatherQuery,
        ) -> std::result::Result<WeatherSnapshot, AdapterError> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn stormy_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            place_label: "Cebu City, Philippines".into(),
            current: CurrentConditions {
                temp_c: 29.0,
                feels_like_c: Some(34.0),
                humidity_pct: Some(80.0),
                precip_mm: Some(4.2),
                wind_speed_kmh: Some(25.0),
                weather_code: Some(95),
                conditions: "Thunderstorm".into(),
            },
            outlook: Some(DailyOutlook {
                label: "today".into(),
                tmin_c: Some(26.0),
                tmax_c: Some(31.0),
                precip_mm: Some(35.0),
                uv_index_max: Some(7.0),
                wind_speed_max_kmh: Some(40.0),
            }),
        }
    }

    fn executor() -> RetryExecutor {
        let limiter = Arc::new(RateLimiter::new(
            BudgetSpec::new(100.0, 100.0),
            Duration::from_secs(2),
        ));
        RetryExecutor::new(
            limiter,
            RetryPolicy::new(3, Duration::from_millis(10), 2.0, Duration::from_secs(1)),
        )
    }

    #[tokio::test]
    async fn payload_carries_snapshot_and_hazards() {
        let adapter = Arc::new(ScriptedWeather::new(vec![Ok(stormy_snapshot())]));
        let tool = WeatherTool::new(adapter, executor());

        let payload = tool
            .run(json!({"city": "Cebu City", "horizon": "today"}))
            .await
            .unwrap();

        assert_eq!(payload["place_label"], "Cebu City, Philippines");
        assert_eq!(payload["current"]["weather_code"], 95);
        let hazards = payload["hazards"].as_array().unwrap();
        // thunderstorm from the code, heavy_rain from the precip sum
        assert!(hazards.contains(&json!("thunderstorm")));
        assert!(hazards.contains(&json!("heavy_rain")));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let adapter = Arc::new(ScriptedWeather::new(vec![
            Err(AdapterError::Network("connection reset".into())),
            Ok(stormy_snapshot()),
        ]));
        let tool = WeatherTool::new(Arc::clone(&adapter) as Arc<dyn WeatherAdapter>, executor());

        let payload = tool.run(json!({"city": "Cebu City"})).await.unwrap();
        assert_eq!(payload["place_label"], "Cebu City, Philippines");
        assert_eq!(adapter.call_count(), 2);
    }

    #[tokio::test]
    async fn unknown_place_fails_without_retries() {
        let adapter = Arc::new(ScriptedWeather::new(vec![Err(
            AdapterError::PlaceNotFound("Xyzzy".into()),
        )]));
        let tool = WeatherTool::new(Arc::clone(&adapter) as Arc<dyn WeatherAdapter>, executor());

        let err = tool.run(json!({"city": "Xyzzy"})).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::Adapter(AdapterError::PlaceNotFound(_))
        ));
        assert_eq!(adapter.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_the_attempt_count() {
        let adapter = Arc::new(ScriptedWeather::new(vec![
            Err(AdapterError::Timeout("slow upstream".into())),
            Err(AdapterError::Timeout("slow upstream".into())),
            Err(AdapterError::Timeout("slow upstream".into())),
        ]));
        let tool = WeatherTool::new(Arc::clone(&adapter) as Arc<dyn WeatherAdapter>, executor());

        let err = tool.run(json!({"city": "Cebu City"})).await.unwrap_err();
        match err {
            ToolError::Exhausted {
                tool_name,
                attempts,
                ..
            } => {
                assert_eq!(tool_name, WEATHER_TOOL_NAME);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Exhausted, got: {other:?}"),
        }
    }
}
