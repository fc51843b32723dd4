//! Provider adapters for CityPulse.
//!
//! Each adapter implements one of the core adapter traits over `reqwest`
//! and maps provider responses into domain types. Adapters never retry or
//! rate-limit themselves; they classify failures (`AdapterError`) so the
//! resilience layer one level up can decide what is worth retrying.
//!
//! - [`OpenMeteoAdapter`]: geocoding plus a two-day forecast (keyless)
//! - [`OpenWeatherAdapter`]: current conditions (API key required)
//! - [`SerpNewsAdapter`]: Google News headlines via SerpAPI
//! - [`CountryResolver`]: city name to news-edition country code

pub mod locale;
pub mod open_meteo;
pub mod open_weather;
pub mod serp_news;

mod dates;
mod http;

pub use locale::CountryResolver;
pub use open_meteo::OpenMeteoAdapter;
pub use open_weather::OpenWeatherAdapter;
pub use serp_news::SerpNewsAdapter;
