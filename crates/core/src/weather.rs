//! Weather domain types shared by the adapters, tools, and risk engine.

use serde::{Deserialize, Serialize};

/// Which day slice of the forecast the caller is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    #[default]
    Today,
    Tomorrow,
}

impl Horizon {
    /// Loose parsing of user phrasing: anything mentioning "today" or
    /// "now" stays on the current day, everything else looks one day out.
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.is_empty() || lower.contains("today") || lower.contains("now") {
            Horizon::Today
        } else {
            Horizon::Tomorrow
        }
    }

    /// Index into a daily forecast block (day 0 = today).
    pub fn day_index(&self) -> usize {
        match self {
            Horizon::Today => 0,
            Horizon::Tomorrow => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::Today => "today",
            Horizon::Tomorrow => "tomorrow",
        }
    }
}

/// A request for one city's weather.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
    #[serde(default)]
    pub horizon: Horizon,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>, horizon: Horizon) -> Self {
        Self {
            city: city.into(),
            horizon,
        }
    }
}

/// Conditions at the time of the fetch.
///
/// Fields other than temperature are optional because not every provider
/// reports them; consumers must tolerate gaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like_c: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_mm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_kmh: Option<f64>,

    /// WMO weather interpretation code, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<u16>,

    /// Human-readable conditions text ("Thunderstorm", "Clear sky", ...).
    pub conditions: String,
}

/// Aggregates for the day slice selected by the query's horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyOutlook {
    /// "today" or "tomorrow".
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmin_c: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmax_c: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_mm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index_max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_max_kmh: Option<f64>,
}

/// Everything a weather adapter reports for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Resolved place name ("Cebu City, Philippines").
    pub place_label: String,

    pub current: CurrentConditions,

    /// Absent when the provider has no daily forecast (current-conditions
    /// only endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlook: Option<DailyOutlook>,
}
