//! The user's question, normalized for the reasoning loop.

use serde::{Deserialize, Serialize};

/// A natural-language question about one city.
///
/// Immutable for the lifetime of a request: the loop, the policy, and the
/// summarizer all read the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// The city the question is about (as the user phrased it).
    pub city: String,

    /// Optional free-form intent, e.g. "is it safe to cycle tomorrow?".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl Query {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            intent: None,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// One-line rendering used in prompts and log lines.
    pub fn describe(&self) -> String {
        match &self.intent {
            Some(intent) => format!("{} — {}", self.city, intent),
            None => self.city.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_with_and_without_intent() {
        let plain = Query::new("Cebu City");
        assert_eq!(plain.describe(), "Cebu City");

        let with_intent = Query::new("Cebu City").with_intent("is it safe to hike tomorrow?");
        assert!(with_intent.describe().contains("Cebu City"));
        assert!(with_intent.describe().contains("hike"));
    }

    #[test]
    fn intent_is_omitted_from_json_when_absent() {
        let q = Query::new("Berlin");
        let json = serde_json::to_string(&q).unwrap();
        assert!(!json.contains("intent"));
    }
}
