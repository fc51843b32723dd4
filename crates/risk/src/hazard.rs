//! Hazard derivation: turning a weather snapshot into discrete hazard
//! signals.
//!
//! Two sources feed the set: the WMO code of the current conditions, and
//! the daily aggregates for the requested horizon. Thresholds:
//!
//! - max temperature >= 35 °C     -> extreme_heat
//! - min temperature <= -5 °C     -> extreme_cold
//! - max wind >= 70 km/h          -> severe_wind
//! - max wind >= 50 km/h          -> high_wind
//! - precipitation sum >= 30 mm   -> heavy_rain
//!
//! A snapshot with a benign code and no threshold breaches yields an
//! empty set; an unknown code never fails, it just contributes nothing.

use citypulse_core::risk::{Hazard, HazardSet};
use citypulse_core::weather::WeatherSnapshot;

use crate::codes::hazard_for_code;

const EXTREME_HEAT_C: f64 = 35.0;
const EXTREME_COLD_C: f64 = -5.0;
const SEVERE_WIND_KMH: f64 = 70.0;
const HIGH_WIND_KMH: f64 = 50.0;
const HEAVY_PRECIP_MM: f64 = 30.0;

/// Derive every hazard signal present in a snapshot.
pub fn derive_hazards(snapshot: &WeatherSnapshot) -> HazardSet {
    let mut hazards = HazardSet::new();

    if let Some(code) = snapshot.current.weather_code {
        if let Some(hazard) = hazard_for_code(code) {
            hazards.insert(hazard);
        }
    }

    if let Some(outlook) = &snapshot.outlook {
        if let Some(tmax) = outlook.tmax_c {
            if tmax >= EXTREME_HEAT_C {
                hazards.insert(Hazard::ExtremeHeat);
            }
        }
        if let Some(tmin) = outlook.tmin_c {
            if tmin <= EXTREME_COLD_C {
                hazards.insert(Hazard::ExtremeCold);
            }
        }
        if let Some(wind) = outlook.wind_speed_max_kmh {
            if wind >= SEVERE_WIND_KMH {
                hazards.insert(Hazard::SevereWind);
            } else if wind >= HIGH_WIND_KMH {
                hazards.insert(Hazard::HighWind);
            }
        }
        if let Some(precip) = outlook.precip_mm {
            if precip >= HEAVY_PRECIP_MM {
                hazards.insert(Hazard::HeavyRain);
            }
        }
    }

    hazards
}
