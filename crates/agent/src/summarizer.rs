//! Turning a finished transcript into the final answer.

use citypulse_core::query::Query;
use citypulse_core::transcript::Transcript;
use citypulse_tools::city_risk::CITY_RISK_TOOL_NAME;
use citypulse_tools::news::NEWS_TOOL_NAME;
use citypulse_tools::weather::WEATHER_TOOL_NAME;

/// Produces the one-paragraph answer from the query and the transcript.
///
/// Whatever the policy did, the summary is grounded in the transcript: a
/// policy-provided answer is only trusted when at least one observation
/// succeeded, and a transcript with zero successes always yields the
/// insufficient-data message.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, query: &Query, transcript: &Transcript, answer: Option<&str>) -> String;
}

/// Deterministic fallback summarizer.
///
/// Assembles the paragraph from the known tool payloads: a weather line,
/// a headline line, and the risk assessment, in that order, skipping
/// whatever is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TranscriptSummarizer;

impl TranscriptSummarizer {
    pub fn new() -> Self {
        Self
    }
}

fn weather_line(payload: &serde_json::Value) -> Option<String> {
    let place = payload.get("place_label")?.as_str()?;
    let current = payload.get("current")?;
    let conditions = current.get("conditions")?.as_str()?;
    let temp = current.get("temp_c")?.as_f64()?;

    let mut line = format!("Weather in {place}: {conditions}, {temp:.1}°C.");
    if let Some(hazards) = payload.get("hazards").and_then(|h| h.as_array()) {
        let names: Vec<&str> = hazards.iter().filter_map(|h| h.as_str()).collect();
        if !names.is_empty() {
            line.push_str(&format!(" Weather hazards: {}.", names.join(", ")));
        }
    }
    Some(line)
}

fn news_line(payload: &serde_json::Value) -> Option<String> {
    let headlines = payload.get("headlines")?.as_array()?;
    if headlines.is_empty() {
        return Some("No recent headlines.".to_string());
    }
    let titles: Vec<&str> = headlines
        .iter()
        .filter_map(|h| h.get("title").and_then(|t| t.as_str()))
        .collect();
    Some(format!("Recent headlines: {}.", titles.join("; ")))
}

fn risk_line(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("assessment")
        .and_then(|a| a.as_str())
        .map(str::to_string)
}

impl Summarizer for TranscriptSummarizer {
    fn summarize(&self, query: &Query, transcript: &Transcript, answer: Option<&str>) -> String {
        if transcript.success_count() == 0 {
            return format!(
                "Insufficient data for {}: no tool call succeeded, so there is \
                 nothing to report. Try again in a little while.",
                query.city
            );
        }

        if let Some(answer) = answer {
            let trimmed = answer.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(line) = transcript.payload_of(WEATHER_TOOL_NAME).and_then(weather_line) {
            parts.push(line);
        }
        if let Some(line) = transcript.payload_of(NEWS_TOOL_NAME).and_then(news_line) {
            parts.push(line);
        }
        if let Some(line) = transcript.payload_of(CITY_RISK_TOOL_NAME).and_then(risk_line) {
            parts.push(line);
        }

        if parts.is_empty() {
            return format!(
                "Data was gathered for {} but no briefing could be assembled from it.",
                query.city
            );
        }
        parts.join(" ")
    }
}
