//! Configuration loading, validation, and management for CityPulse.
//!
//! Loads configuration from `~/.citypulse/config.toml` with environment
//! variable overrides. Validates all settings at startup. Configuration is
//! plain data: the composition root turns these values into limiters,
//! retry policies, and adapters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.citypulse/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reasoning loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Retry/backoff settings shared by all tools
    #[serde(default)]
    pub retry: RetryConfig,

    /// Per-provider rate budgets
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,

    /// External data provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// LLM decision policy settings
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Reasoning loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Hard bound on tool calls per request.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Deadline for a single tool invocation, retries included.
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
}

fn default_max_steps() -> usize {
    6
}
fn default_step_timeout_secs() -> u64 {
    20
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            step_timeout_secs: default_step_timeout_secs(),
        }
    }
}

impl AgentConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }
}

/// Retry/backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per operation, first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff after the first failure.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff growth factor per subsequent failure.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Ceiling on a single backoff sleep.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_multiplier() -> f64 {
    2.0
}
fn default_max_delay_ms() -> u64 {
    8_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Per-provider rate budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitsConfig {
    /// Longest an admission may wait before failing the call.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,

    /// Budget applied to providers without an explicit entry.
    #[serde(default)]
    pub default: RateBudgetConfig,

    /// Explicit budgets by provider id.
    #[serde(default = "default_provider_budgets")]
    pub providers: HashMap<String, RateBudgetConfig>,
}

fn default_max_wait_ms() -> u64 {
    2_000
}

fn default_provider_budgets() -> HashMap<String, RateBudgetConfig> {
    HashMap::from([
        ("open-meteo".to_string(), RateBudgetConfig::new(5.0, 5.0)),
        ("openweather".to_string(), RateBudgetConfig::new(5.0, 5.0)),
        ("serpapi".to_string(), RateBudgetConfig::new(2.0, 2.0)),
    ])
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: default_max_wait_ms(),
            default: RateBudgetConfig::default(),
            providers: default_provider_budgets(),
        }
    }
}

impl RateLimitsConfig {
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// One provider's token bucket: burst capacity plus refill rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateBudgetConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

impl RateBudgetConfig {
    pub fn new(capacity: f64, refill_per_sec: f64) -> Self {
        Self {
            capacity,
            refill_per_sec,
        }
    }
}

impl Default for RateBudgetConfig {
    fn default() -> Self {
        Self::new(2.0, 1.0)
    }
}

/// External data provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Which backend answers weather queries: "open-meteo" (keyless) or
    /// "openweather".
    #[serde(default = "default_weather_source")]
    pub weather_source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openweather_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_api_key: Option<String>,

    #[serde(default = "default_openweather_current_url")]
    pub openweather_current_url: String,

    #[serde(default = "default_openmeteo_geocode_url")]
    pub openmeteo_geocode_url: String,

    #[serde(default = "default_openmeteo_forecast_url")]
    pub openmeteo_forecast_url: String,

    #[serde(default = "default_serpapi_search_url")]
    pub serpapi_search_url: String,
}

fn default_weather_source() -> String {
    "open-meteo".into()
}
fn default_openweather_current_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".into()
}
fn default_openmeteo_geocode_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".into()
}
fn default_openmeteo_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}
fn default_serpapi_search_url() -> String {
    "https://serpapi.com/search.json".into()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            weather_source: default_weather_source(),
            openweather_api_key: None,
            serpapi_api_key: None,
            openweather_current_url: default_openweather_current_url(),
            openmeteo_geocode_url: default_openmeteo_geocode_url(),
            openmeteo_forecast_url: default_openmeteo_forecast_url(),
            serpapi_search_url: default_serpapi_search_url(),
        }
    }
}

/// LLM decision policy settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Deterministic by default; the policy's job is routing, not prose.
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
}

fn default_llm_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}
fn default_llm_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_llm_temperature(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("agent", &self.agent)
            .field("retry", &self.retry)
            .field("rate_limits", &self.rate_limits)
            .field("providers", &self.providers)
            .field("llm", &self.llm)
            .finish()
    }
}

impl std::fmt::Debug for ProvidersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvidersConfig")
            .field("weather_source", &self.weather_source)
            .field("openweather_api_key", &redact(&self.openweather_api_key))
            .field("serpapi_api_key", &redact(&self.serpapi_api_key))
            .field("openweather_current_url", &self.openweather_current_url)
            .field("openmeteo_geocode_url", &self.openmeteo_geocode_url)
            .field("openmeteo_forecast_url", &self.openmeteo_forecast_url)
            .field("serpapi_search_url", &self.serpapi_search_url)
            .finish()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.citypulse/config.toml).
    ///
    /// Also checks environment variables:
    /// - `CITYPULSE_API_KEY` / `OPENROUTER_API_KEY` for the LLM key
    /// - `CITYPULSE_MODEL` for the LLM model
    /// - `OPENWEATHER_API_KEY`
    /// - `SERPAPI_API_KEY` / `SERP_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("CITYPULSE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok());
        }
        if let Ok(model) = std::env::var("CITYPULSE_MODEL") {
            config.llm.model = model;
        }
        if config.providers.openweather_api_key.is_none() {
            config.providers.openweather_api_key = std::env::var("OPENWEATHER_API_KEY").ok();
        }
        if config.providers.serpapi_api_key.is_none() {
            config.providers.serpapi_api_key = std::env::var("SERPAPI_API_KEY")
                .ok()
                .or_else(|| std::env::var("SERP_API_KEY").ok());
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".citypulse")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_steps must be at least 1".into(),
            ));
        }
        if self.agent.step_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.step_timeout_secs must be at least 1".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.multiplier < 1.0 {
            return Err(ConfigError::ValidationError(
                "retry.multiplier must be >= 1.0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "llm.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let mut budgets: Vec<(&str, &RateBudgetConfig)> =
            vec![("default", &self.rate_limits.default)];
        budgets.extend(
            self.rate_limits
                .providers
                .iter()
                .map(|(name, budget)| (name.as_str(), budget)),
        );
        for (name, budget) in budgets {
            if budget.capacity < 1.0 {
                return Err(ConfigError::ValidationError(format!(
                    "rate budget '{name}' must have capacity >= 1"
                )));
            }
            if budget.refill_per_sec <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "rate budget '{name}' must refill at a positive rate"
                )));
            }
        }

        match self.providers.weather_source.as_str() {
            "open-meteo" | "openweather" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "providers.weather_source must be 'open-meteo' or 'openweather', got '{other}'"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            retry: RetryConfig::default(),
            rate_limits: RateLimitsConfig::default(),
            providers: ProvidersConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_steps, 6);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.providers.weather_source, "open-meteo");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn default_budgets_match_provider_quotas() {
        let config = AppConfig::default();
        let weather = &config.rate_limits.providers["open-meteo"];
        assert_eq!(weather.capacity, 5.0);
        assert_eq!(weather.refill_per_sec, 5.0);
        let news = &config.rate_limits.providers["serpapi"];
        assert_eq!(news.capacity, 2.0);
        assert_eq!(news.refill_per_sec, 2.0);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.agent.max_steps, config.agent.max_steps);
        assert_eq!(parsed.retry.base_delay_ms, config.retry.base_delay_ms);
        assert_eq!(
            parsed.rate_limits.providers.len(),
            config.rate_limits.providers.len()
        );
    }

    #[test]
    fn zero_max_steps_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn shrinking_multiplier_rejected() {
        let mut config = AppConfig::default();
        config.retry.multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_refill_budget_rejected() {
        let mut config = AppConfig::default();
        config
            .rate_limits
            .providers
            .insert("stuck".into(), RateBudgetConfig::new(5.0, 0.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_weather_source_rejected() {
        let mut config = AppConfig::default();
        config.providers.weather_source = "accuweather".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().agent.max_steps, 6);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[agent]
max_steps = 4

[retry]
max_attempts = 5
base_delay_ms = 100

[rate_limits.providers.serpapi]
capacity = 1.0
refill_per_sec = 0.5

[providers]
weather_source = "openweather"
openweather_api_key = "k-123"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.agent.max_steps, 4);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 100);
        assert_eq!(config.rate_limits.providers["serpapi"].capacity, 1.0);
        assert_eq!(config.providers.weather_source, "openweather");
        assert_eq!(
            config.providers.openweather_api_key.as_deref(),
            Some("k-123")
        );
        // A partial [rate_limits] table only overrides what it names.
        assert_eq!(config.rate_limits.max_wait_ms, 2_000);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-or-very-secret".into());
        config.providers.serpapi_api_key = Some("serp-secret".into());

        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("serp-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("open-meteo"));
        assert!(toml_str.contains("max_steps"));
    }
}
