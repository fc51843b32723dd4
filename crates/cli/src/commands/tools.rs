//! `citypulse tools`, list the registered tools and their arguments.

use std::sync::Arc;
use std::time::Duration;

use citypulse_adapters::{CountryResolver, OpenMeteoAdapter, SerpNewsAdapter};
use citypulse_config::AppConfig;
use citypulse_core::adapter::{NewsAdapter, WeatherAdapter};
use citypulse_resilience::{BudgetSpec, RateLimiter, RetryExecutor, RetryPolicy};
use citypulse_tools::standard_registry;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Nothing here touches the network; the registry is built only to
    // read the registered specs back out.
    let config = AppConfig::default();
    let limiter = Arc::new(RateLimiter::new(
        BudgetSpec::new(1.0, 1.0),
        Duration::from_millis(0),
    ));
    let executor = RetryExecutor::new(
        limiter,
        RetryPolicy::new(1, Duration::from_millis(1), 2.0, Duration::from_millis(1)),
    );
    let weather: Arc<dyn WeatherAdapter> = Arc::new(OpenMeteoAdapter::new(
        &config.providers.openmeteo_geocode_url,
        &config.providers.openmeteo_forecast_url,
    ));
    let news: Arc<dyn NewsAdapter> = Arc::new(SerpNewsAdapter::new(
        &config.providers.serpapi_search_url,
        "",
        CountryResolver::new(&config.providers.openmeteo_geocode_url),
    ));
    let registry = standard_registry(weather, news, executor, Duration::from_secs(1));

    println!("🧰 CityPulse Tools");
    println!("==================");
    for spec in registry.specs() {
        println!();
        println!("  {}", spec.name);
        println!("    {}", spec.description);
        let args = args_line(&spec.input_schema);
        if !args.is_empty() {
            println!("    args: {args}");
        }
    }
    println!();

    Ok(())
}

/// Render a schema's properties as "name (required), other" for display.
fn args_line(schema: &serde_json::Value) -> String {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let Some(props) = schema.get("properties").and_then(|p| p.as_object()) else {
        return String::new();
    };

    props
        .keys()
        .map(|name| {
            if required.contains(&name.as_str()) {
                format!("{name} (required)")
            } else {
                name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn args_line_marks_required_arguments() {
        let schema = json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "horizon": {"type": "string"}
            },
            "required": ["city"]
        });

        assert_eq!(args_line(&schema), "city (required), horizon");
    }

    #[test]
    fn args_line_handles_schemas_without_properties() {
        assert_eq!(args_line(&json!({"type": "object"})), "");
    }
}
