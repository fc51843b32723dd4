//! OpenWeather adapter: current conditions only.
//!
//! The current-weather endpoint resolves the city name itself, so there is
//! no geocoding step, but it also reports no daily forecast and no WMO
//! code. Snapshots from this adapter therefore carry no outlook block and
//! an empty weather code; the risk layer still works off the thresholds it
//! can see. Requires an API key.

use async_trait::async_trait;
use citypulse_core::adapter::WeatherAdapter;
use citypulse_core::error::AdapterError;
use citypulse_core::weather::{CurrentConditions, WeatherQuery, WeatherSnapshot};
use serde::Deserialize;

use crate::http;

/// Reported wind speeds are m/s under metric units.
const MS_TO_KMH: f64 = 3.6;

pub struct OpenWeatherAdapter {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherAdapter {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http::client(),
        }
    }

    fn build_snapshot(body: ApiCurrentWeather) -> Result<WeatherSnapshot, AdapterError> {
        let temp_c = body.main.as_ref().and_then(|m| m.temp).ok_or_else(|| {
            AdapterError::InvalidResponse("current weather missing temperature".into())
        })?;

        let conditions = body
            .weather
            .first()
            .and_then(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown conditions".to_string());

        let place_label = match &body.sys.and_then(|s| s.country) {
            Some(country) => format!("{}, {}", body.name, country),
            None => body.name.clone(),
        };

        Ok(WeatherSnapshot {
            place_label,
            current: CurrentConditions {
                temp_c,
                feels_like_c: body.main.as_ref().and_then(|m| m.feels_like),
                humidity_pct: body.main.as_ref().and_then(|m| m.humidity),
                precip_mm: body.rain.and_then(|r| r.one_hour),
                wind_speed_kmh: body.wind.and_then(|w| w.speed).map(|s| s * MS_TO_KMH),
                weather_code: None,
                conditions,
            },
            outlook: None,
        })
    }
}

#[async_trait]
impl WeatherAdapter for OpenWeatherAdapter {
    fn provider_id(&self) -> &str {
        "openweather"
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, AdapterError> {
        if self.api_key.is_empty() {
            return Err(AdapterError::NotConfigured("OPENWEATHER_API_KEY".into()));
        }

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", query.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(http::request_error)?;

        let body: ApiCurrentWeather = http::read_json(response, "current weather").await?;
        Self::build_snapshot(body)
    }
}

// --- OpenWeather API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiCurrentWeather {
    #[serde(default)]
    name: String,
    sys: Option<ApiSys>,
    #[serde(default)]
    weather: Vec<ApiWeatherEntry>,
    main: Option<ApiMain>,
    wind: Option<ApiWind>,
    rain: Option<ApiRain>,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiWeatherEntry {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "name": "Cebu City",
        "sys": {"country": "PH", "sunrise": 1756071234},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain"}],
        "main": {"temp": 28.4, "feels_like": 33.1, "humidity": 79, "pressure": 1009},
        "wind": {"speed": 4.1, "deg": 220},
        "rain": {"1h": 0.6}
    }"#;

    #[test]
    fn snapshot_from_current_weather() {
        let body: ApiCurrentWeather = serde_json::from_str(BODY).unwrap();
        let snapshot = OpenWeatherAdapter::build_snapshot(body).unwrap();

        assert_eq!(snapshot.place_label, "Cebu City, PH");
        assert_eq!(snapshot.current.temp_c, 28.4);
        assert_eq!(snapshot.current.conditions, "light rain");
        assert_eq!(snapshot.current.precip_mm, Some(0.6));
        assert!(snapshot.outlook.is_none());
        assert!(snapshot.current.weather_code.is_none());
    }

    #[test]
    fn wind_speed_converted_to_kmh() {
        let body: ApiCurrentWeather = serde_json::from_str(BODY).unwrap();
        let snapshot = OpenWeatherAdapter::build_snapshot(body).unwrap();
        let wind = snapshot.current.wind_speed_kmh.unwrap();
        assert!((wind - 14.76).abs() < 1e-9);
    }

    #[test]
    fn missing_temperature_is_invalid() {
        let body: ApiCurrentWeather =
            serde_json::from_str(r#"{"name": "Somewhere", "main": {"humidity": 50}}"#).unwrap();
        let err = OpenWeatherAdapter::build_snapshot(body).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn empty_api_key_is_not_configured() {
        let adapter = OpenWeatherAdapter::new("https://example.invalid/weather", "");
        let query = WeatherQuery::new("Cebu City", Default::default());
        let err = adapter.fetch(&query).await.unwrap_err();
        assert!(matches!(err, AdapterError::NotConfigured(_)));
    }
}
