//! `citypulse ask`, answer a weather/news/risk question about a city.

use std::path::PathBuf;
use std::sync::Arc;

use citypulse_adapters::{CountryResolver, OpenMeteoAdapter, OpenWeatherAdapter, SerpNewsAdapter};
use citypulse_agent::ReasoningLoop;
use citypulse_config::AppConfig;
use citypulse_core::adapter::{NewsAdapter, WeatherAdapter};
use citypulse_core::policy::DecisionPolicy;
use citypulse_core::query::Query;
use citypulse_policy::{LlmPolicy, RulePolicy};
use citypulse_resilience::{BudgetSpec, RateLimiter, RetryExecutor, RetryPolicy};
use citypulse_tools::{standard_registry, ToolRegistry};
use tracing::debug;

pub async fn run(
    city: String,
    intent: Option<String>,
    offline: bool,
    show_transcript: bool,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &config_path {
        Some(path) => {
            AppConfig::load_from(path).map_err(|e| format!("Failed to load config: {e}"))?
        }
        None => AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?,
    };
    debug!(
        weather_source = %config.providers.weather_source,
        llm_configured = config.llm.api_key.is_some(),
        "configuration loaded"
    );

    let registry = Arc::new(build_registry(&config));
    let policy = build_policy(&config, offline, &registry);

    let agent =
        ReasoningLoop::new(policy, Arc::clone(&registry)).with_max_steps(config.agent.max_steps);

    let mut query = Query::new(city);
    if let Some(intent) = intent {
        query = query.with_intent(intent);
    }

    eprint!("  Gathering...");
    let report = agent.run(query).await?;
    eprint!("\r             \r");

    println!("{}", report.summary);

    if let Some(verdict) = &report.risk_verdict {
        println!();
        println!("  Risk level: {}", verdict.category.label());
        if !verdict.contributing_factors.is_empty() {
            println!("  Factors:    {}", verdict.factors_line());
        }
    }

    if show_transcript {
        println!();
        println!(
            "  Transcript ({} of {} steps):",
            report.transcript.len(),
            report.transcript.max_steps()
        );
        for line in report.transcript.render().lines() {
            println!("    {line}");
        }
    }

    Ok(())
}

/// Wire adapters and the shared resilience layer into a tool registry.
fn build_registry(config: &AppConfig) -> ToolRegistry {
    let defaults = &config.rate_limits.default;
    let mut limiter = RateLimiter::new(
        BudgetSpec::new(defaults.capacity, defaults.refill_per_sec),
        config.rate_limits.max_wait(),
    );
    for (provider, budget) in &config.rate_limits.providers {
        limiter = limiter.with_budget(
            provider.clone(),
            BudgetSpec::new(budget.capacity, budget.refill_per_sec),
        );
    }

    let executor = RetryExecutor::new(
        Arc::new(limiter),
        RetryPolicy::new(
            config.retry.max_attempts,
            config.retry.base_delay(),
            config.retry.multiplier,
            config.retry.max_delay(),
        ),
    );

    // Config validation already rejected unknown weather sources.
    let weather: Arc<dyn WeatherAdapter> = match config.providers.weather_source.as_str() {
        "openweather" => Arc::new(OpenWeatherAdapter::new(
            &config.providers.openweather_current_url,
            config.providers.openweather_api_key.clone().unwrap_or_default(),
        )),
        _ => Arc::new(OpenMeteoAdapter::new(
            &config.providers.openmeteo_geocode_url,
            &config.providers.openmeteo_forecast_url,
        )),
    };

    let news: Arc<dyn NewsAdapter> = Arc::new(SerpNewsAdapter::new(
        &config.providers.serpapi_search_url,
        config.providers.serpapi_api_key.clone().unwrap_or_default(),
        CountryResolver::new(&config.providers.openmeteo_geocode_url),
    ));

    standard_registry(weather, news, executor, config.agent.step_timeout())
}

/// Pick the decision policy: the LLM when a key is configured, otherwise
/// the deterministic rule sequence.
fn build_policy(
    config: &AppConfig,
    offline: bool,
    registry: &ToolRegistry,
) -> Arc<dyn DecisionPolicy> {
    if offline {
        return Arc::new(RulePolicy::new());
    }

    match &config.llm.api_key {
        Some(api_key) => Arc::new(
            LlmPolicy::new(
                &config.llm.base_url,
                api_key.clone(),
                &config.llm.model,
                registry.specs(),
            )
            .with_temperature(f64::from(config.llm.temperature)),
        ),
        None => {
            eprintln!("  No LLM API key configured; using the offline rule policy.");
            eprintln!("  Set OPENROUTER_API_KEY (or llm.api_key in config.toml) for model-driven runs.");
            eprintln!();
            Arc::new(RulePolicy::new())
        }
    }
}
