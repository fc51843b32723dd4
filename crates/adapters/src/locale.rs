//! Country-code resolution for news locales.
//!
//! News editions are regional: asking for Cebu City news through the "us"
//! edition returns near nothing. The resolver geocodes the city name and
//! takes the country code of the first hit. It never fails the caller;
//! anything that goes wrong falls back to "us", which still returns data.

use serde::Deserialize;
use tracing::debug;

use crate::http;

const FALLBACK_COUNTRY: &str = "us";

pub struct CountryResolver {
    geocode_url: String,
    client: reqwest::Client,
}

impl CountryResolver {
    pub fn new(geocode_url: impl Into<String>) -> Self {
        Self {
            geocode_url: geocode_url.into().trim_end_matches('/').to_string(),
            client: http::client(),
        }
    }

    /// Two-letter lowercase country code for a city, "us" when the city
    /// cannot be resolved.
    pub async fn country_code(&self, city: &str) -> String {
        match self.lookup(city).await {
            Some(code) if !code.is_empty() => code.to_lowercase(),
            _ => {
                debug!(city = %city, "country resolution failed, using fallback");
                FALLBACK_COUNTRY.to_string()
            }
        }
    }

    async fn lookup(&self, city: &str) -> Option<String> {
        let response = self
            .client
            .get(&self.geocode_url)
            .query(&[("name", city), ("count", "1")])
            .send()
            .await
            .ok()?;

        let body: ApiGeocodeCountry = http::read_json(response, "country lookup").await.ok()?;
        body.results?.into_iter().next()?.country_code
    }
}

#[derive(Debug, Deserialize)]
struct ApiGeocodeCountry {
    results: Option<Vec<ApiCountryHit>>,
}

#[derive(Debug, Deserialize)]
struct ApiCountryHit {
    country_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_country_hit() {
        let data = r#"{"results":[{"name":"Cebu City","country_code":"PH","latitude":10.3,"longitude":123.9}]}"#;
        let parsed: ApiGeocodeCountry = serde_json::from_str(data).unwrap();
        let code = parsed.results.unwrap().into_iter().next().unwrap().country_code;
        assert_eq!(code.as_deref(), Some("PH"));
    }

    #[test]
    fn parse_empty_results() {
        let data = r#"{"generationtime_ms":0.5}"#;
        let parsed: ApiGeocodeCountry = serde_json::from_str(data).unwrap();
        assert!(parsed.results.is_none());
    }
}
