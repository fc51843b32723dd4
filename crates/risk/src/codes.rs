//! WMO weather interpretation code tables.
//!
//! Open-Meteo reports conditions as WMO interpretation codes. Two lookups
//! live here: a human-readable description for snapshots, and the hazard
//! class a code contributes to the risk picture. The hazard sets are
//! disjoint, so a code maps to at most one hazard.

use citypulse_core::risk::Hazard;

const THUNDERSTORM_CODES: &[u16] = &[95, 96, 99];
const HEAVY_RAIN_CODES: &[u16] = &[65, 67, 82];
const SNOW_CODES: &[u16] = &[71, 73, 75, 77, 85, 86];
const RAIN_CODES: &[u16] = &[51, 53, 55, 56, 57, 61, 63, 66, 80, 81];
const FOG_CODES: &[u16] = &[45, 48];

/// Human-readable description for a WMO code. Unknown codes get a
/// placeholder, never an error.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown conditions",
    }
}

/// The hazard a WMO code contributes, if any. Clear/cloudy codes and
/// codes we have never seen map to nothing.
pub fn hazard_for_code(code: u16) -> Option<Hazard> {
    if THUNDERSTORM_CODES.contains(&code) {
        Some(Hazard::Thunderstorm)
    } else if HEAVY_RAIN_CODES.contains(&code) {
        Some(Hazard::HeavyRain)
    } else if SNOW_CODES.contains(&code) {
        Some(Hazard::Snow)
    } else if RAIN_CODES.contains(&code) {
        Some(Hazard::Rain)
    } else if FOG_CODES.contains(&code) {
        Some(Hazard::Fog)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_cover_the_common_codes() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(63), "Moderate rain");
        assert_eq!(describe_weather_code(95), "Thunderstorm");
        assert_eq!(describe_weather_code(99), "Thunderstorm with heavy hail");
        assert_eq!(describe_weather_code(42), "Unknown conditions");
    }

    #[test]
    fn thunderstorm_codes() {
        for code in [95, 96, 99] {
            assert_eq!(hazard_for_code(code), Some(Hazard::Thunderstorm));
        }
    }

    #[test]
    fn precipitation_codes_split_by_intensity_and_phase() {
        assert_eq!(hazard_for_code(61), Some(Hazard::Rain));
        assert_eq!(hazard_for_code(65), Some(Hazard::HeavyRain));
        assert_eq!(hazard_for_code(82), Some(Hazard::HeavyRain));
        assert_eq!(hazard_for_code(71), Some(Hazard::Snow));
        assert_eq!(hazard_for_code(75), Some(Hazard::Snow));
        assert_eq!(hazard_for_code(45), Some(Hazard::Fog));
    }

    #[test]
    fn benign_and_unknown_codes_map_to_nothing() {
        for code in [0, 1, 2, 3] {
            assert_eq!(hazard_for_code(code), None);
        }
        assert_eq!(hazard_for_code(42), None);
        assert_eq!(hazard_for_code(200), None);
    }

    #[test]
    fn every_hazard_code_has_a_real_description() {
        let all = THUNDERSTORM_CODES
            .iter()
            .chain(HEAVY_RAIN_CODES)
            .chain(SNOW_CODES)
            .chain(RAIN_CODES)
            .chain(FOG_CODES);
        for &code in all {
            assert_ne!(describe_weather_code(code), "Unknown conditions", "code {code}");
        }
    }
}
