//! # CityPulse Risk
//!
//! Pure interpretation rules: WMO weather-code tables, hazard derivation
//! from forecast data, and the classifier that fuses hazards with recent
//! headlines into a [`RiskVerdict`]. No I/O anywhere in this crate: the
//! same inputs always produce the same verdict, which is what makes the
//! risk behavior testable without any provider.

pub mod classifier;
pub mod codes;
pub mod hazard;

pub use classifier::{classify, ALERT_KEYWORDS, DISRUPTION_KEYWORDS};
pub use codes::{describe_weather_code, hazard_for_code};
pub use hazard::derive_hazards;
