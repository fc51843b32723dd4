//! News domain types shared by the adapters, tools, and risk engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request for recent headlines about one city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsQuery {
    pub city: String,

    /// Two-letter lowercase country code steering the provider's regional
    /// edition (e.g. "ph", "de"). When absent the adapter resolves one from
    /// the city name, falling back to "us".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl NewsQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// One dated headline.
///
/// Adapters drop items whose publication date they cannot parse, so
/// `published_at` is always present here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub published_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Headline {
    pub fn new(title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            source: None,
            published_at,
            link: None,
            snippet: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Title and snippet joined for keyword scans.
    pub fn text(&self) -> String {
        match &self.snippet {
            Some(snippet) => format!("{} {}", self.title, snippet),
            None => self.title.clone(),
        }
    }
}
