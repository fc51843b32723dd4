//! Open-Meteo adapter: geocoding plus a two-day forecast.
//!
//! Both endpoints are keyless. The geocoding search resolves a city name
//! to coordinates and a timezone (first hit wins); the forecast endpoint
//! returns current conditions as WMO interpretation codes along with daily
//! aggregates for today and tomorrow. The query's horizon selects which of
//! the two daily slices ends up in the snapshot.

use async_trait::async_trait;
use citypulse_core::adapter::WeatherAdapter;
use citypulse_core::error::AdapterError;
use citypulse_core::weather::{
    CurrentConditions, DailyOutlook, Horizon, WeatherQuery, WeatherSnapshot,
};
use citypulse_risk::describe_weather_code;
use serde::Deserialize;
use tracing::debug;

use crate::http;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
                              precipitation,wind_speed_10m,weather_code,is_day";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,\
                            uv_index_max,wind_speed_10m_max";
const FORECAST_DAYS: &str = "2";

pub struct OpenMeteoAdapter {
    geocode_url: String,
    forecast_url: String,
    client: reqwest::Client,
}

impl OpenMeteoAdapter {
    pub fn new(geocode_url: impl Into<String>, forecast_url: impl Into<String>) -> Self {
        Self {
            geocode_url: geocode_url.into().trim_end_matches('/').to_string(),
            forecast_url: forecast_url.into().trim_end_matches('/').to_string(),
            client: http::client(),
        }
    }

    /// Resolve a city name to the best geocoding hit.
    pub async fn geocode(&self, city: &str) -> Result<GeoPlace, AdapterError> {
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(http::request_error)?;

        let body: ApiGeocodeResponse = http::read_json(response, "geocoding").await?;
        body.results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::PlaceNotFound(city.to_string()))
    }

    async fn forecast(&self, place: &GeoPlace) -> Result<ApiForecast, AdapterError> {
        let timezone = place.timezone.as_deref().unwrap_or("auto");
        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", place.latitude.to_string()),
                ("longitude", place.longitude.to_string()),
                ("timezone", timezone.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ])
            .send()
            .await
            .map_err(http::request_error)?;

        http::read_json(response, "forecast").await
    }

    fn build_snapshot(
        place: &GeoPlace,
        forecast: ApiForecast,
        horizon: Horizon,
    ) -> Result<WeatherSnapshot, AdapterError> {
        let current = forecast.current.ok_or_else(|| {
            AdapterError::InvalidResponse("forecast response missing current block".into())
        })?;
        let temp_c = current.temperature_2m.ok_or_else(|| {
            AdapterError::InvalidResponse("forecast response missing current temperature".into())
        })?;

        let idx = horizon.day_index();
        let outlook = forecast.daily.map(|daily| DailyOutlook {
            label: horizon.label().to_string(),
            tmin_c: pick(&daily.temperature_2m_min, idx),
            tmax_c: pick(&daily.temperature_2m_max, idx),
            precip_mm: pick(&daily.precipitation_sum, idx),
            uv_index_max: pick(&daily.uv_index_max, idx),
            wind_speed_max_kmh: pick(&daily.wind_speed_10m_max, idx),
        });

        Ok(WeatherSnapshot {
            place_label: place.label(),
            current: CurrentConditions {
                temp_c,
                feels_like_c: current.apparent_temperature,
                humidity_pct: current.relative_humidity_2m,
                precip_mm: current.precipitation,
                wind_speed_kmh: current.wind_speed_10m,
                weather_code: current.weather_code,
                conditions: current
                    .weather_code
                    .map(describe_weather_code)
                    .unwrap_or("Unknown conditions")
                    .to_string(),
            },
            outlook,
        })
    }
}

#[async_trait]
impl WeatherAdapter for OpenMeteoAdapter {
    fn provider_id(&self) -> &str {
        "open-meteo"
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, AdapterError> {
        let place = self.geocode(&query.city).await?;
        debug!(
            city = %query.city,
            lat = place.latitude,
            lon = place.longitude,
            "geocoded"
        );

        let forecast = self.forecast(&place).await?;
        Self::build_snapshot(&place, forecast, query.horizon)
    }
}

/// One geocoding hit.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl GeoPlace {
    /// "Cebu City, Philippines" when the country is known.
    pub fn label(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

// --- Open-Meteo API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiGeocodeResponse {
    results: Option<Vec<GeoPlace>>,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    current: Option<ApiCurrent>,
    daily: Option<ApiDaily>,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    precipitation: Option<f64>,
    wind_speed_10m: Option<f64>,
    weather_code: Option<u16>,
}

/// Daily arrays are index-aligned with the returned day list and may
/// contain nulls for metrics the model does not produce everywhere.
#[derive(Debug, Deserialize)]
struct ApiDaily {
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
}

fn pick(values: &[Option<f64>], idx: usize) -> Option<f64> {
    values.get(idx).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOCODE_BODY: &str = r#"{
        "results": [{
            "id": 1717512,
            "name": "Cebu City",
            "latitude": 10.31672,
            "longitude": 123.89071,
            "country": "Philippines",
            "country_code": "PH",
            "timezone": "Asia/Manila",
            "admin1": "Central Visayas"
        }],
        "generationtime_ms": 0.7
    }"#;

    const FORECAST_BODY: &str = r#"{
        "latitude": 10.3125,
        "longitude": 123.875,
        "timezone": "Asia/Manila",
        "current": {
            "time": "2026-08-25T11:30",
            "temperature_2m": 31.4,
            "relative_humidity_2m": 68,
            "apparent_temperature": 37.9,
            "precipitation": 0.0,
            "wind_speed_10m": 11.2,
            "weather_code": 2,
            "is_day": 1
        },
        "daily": {
            "time": ["2026-08-25", "2026-08-26"],
            "temperature_2m_max": [33.1, 36.2],
            "temperature_2m_min": [26.4, 26.9],
            "precipitation_sum": [2.3, 0.0],
            "uv_index_max": [9.1, null],
            "wind_speed_10m_max": [18.5, 22.0]
        }
    }"#;

    fn cebu() -> GeoPlace {
        let parsed: ApiGeocodeResponse = serde_json::from_str(GEOCODE_BODY).unwrap();
        parsed.results.unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn parse_geocode_hit() {
        let place = cebu();
        assert_eq!(place.name, "Cebu City");
        assert_eq!(place.country_code.as_deref(), Some("PH"));
        assert_eq!(place.timezone.as_deref(), Some("Asia/Manila"));
        assert_eq!(place.label(), "Cebu City, Philippines");
    }

    #[test]
    fn snapshot_for_today_uses_day_zero() {
        let forecast: ApiForecast = serde_json::from_str(FORECAST_BODY).unwrap();
        let snapshot =
            OpenMeteoAdapter::build_snapshot(&cebu(), forecast, Horizon::Today).unwrap();

        assert_eq!(snapshot.place_label, "Cebu City, Philippines");
        assert_eq!(snapshot.current.temp_c, 31.4);
        assert_eq!(snapshot.current.weather_code, Some(2));
        assert_eq!(snapshot.current.conditions, "Partly cloudy");

        let outlook = snapshot.outlook.unwrap();
        assert_eq!(outlook.label, "today");
        assert_eq!(outlook.tmax_c, Some(33.1));
        assert_eq!(outlook.uv_index_max, Some(9.1));
    }

    #[test]
    fn snapshot_for_tomorrow_uses_day_one_and_tolerates_nulls() {
        let forecast: ApiForecast = serde_json::from_str(FORECAST_BODY).unwrap();
        let snapshot =
            OpenMeteoAdapter::build_snapshot(&cebu(), forecast, Horizon::Tomorrow).unwrap();

        let outlook = snapshot.outlook.unwrap();
        assert_eq!(outlook.label, "tomorrow");
        assert_eq!(outlook.tmax_c, Some(36.2));
        assert_eq!(outlook.uv_index_max, None);
        assert_eq!(outlook.wind_speed_max_kmh, Some(22.0));
    }

    #[test]
    fn missing_current_block_is_invalid() {
        let forecast: ApiForecast = serde_json::from_str(r#"{"daily": null}"#).unwrap();
        let err = OpenMeteoAdapter::build_snapshot(&cebu(), forecast, Horizon::Today)
            .unwrap_err();
        assert!(matches!(err, AdapterError::InvalidResponse(_)));
    }

    #[test]
    fn empty_geocode_results_parse() {
        let parsed: ApiGeocodeResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.3}"#).unwrap();
        assert!(parsed.results.is_none());
    }

    #[test]
    fn place_label_without_country() {
        let place = GeoPlace {
            name: "Nowhere".into(),
            latitude: 0.0,
            longitude: 0.0,
            country: None,
            country_code: None,
            timezone: None,
        };
        assert_eq!(place.label(), "Nowhere");
    }
}
