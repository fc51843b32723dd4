//! Deterministic fallback policy.
//!
//! Walks a fixed sequence: weather, then news, then the combined risk
//! assessment, then finish. Tool failures do not derail it; a tool that has
//! been tried counts as done whatever the outcome, and the summarizer works
//! from whichever observations succeeded.

use async_trait::async_trait;
use citypulse_core::error::PolicyError;
use citypulse_core::policy::{Decision, DecisionPolicy};
use citypulse_core::query::Query;
use citypulse_core::tool::ToolCall;
use citypulse_core::transcript::Transcript;
use tracing::debug;

const SEQUENCE: &[&str] = &["weather_tool", "news_tool", "city_risk_tool"];

/// Offline decision policy: fixed tool sequence, no network.
#[derive(Debug, Default, Clone, Copy)]
pub struct RulePolicy;

impl RulePolicy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DecisionPolicy for RulePolicy {
    fn name(&self) -> &str {
        "rules"
    }

    async fn decide(
        &self,
        query: &Query,
        transcript: &Transcript,
    ) -> std::result::Result<Decision, PolicyError> {
        for tool in SEQUENCE {
            if !transcript.has_called(tool) {
                debug!(tool, city = %query.city, "next step in the fixed sequence");
                return Ok(Decision::Call(ToolCall::new(
                    *tool,
                    serde_json::json!({"city": query.city}),
                )));
            }
        }
        debug!(steps = transcript.len(), "sequence complete, finishing");
        Ok(Decision::finish())
    }
}
