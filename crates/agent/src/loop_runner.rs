//! The reasoning loop implementation.

use std::sync::Arc;

use citypulse_core::error::Result;
use citypulse_core::policy::{Decision, DecisionPolicy};
use citypulse_core::query::Query;
use citypulse_core::risk::RiskVerdict;
use citypulse_core::transcript::Transcript;
use citypulse_tools::city_risk::CITY_RISK_TOOL_NAME;
use citypulse_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::summarizer::{Summarizer, TranscriptSummarizer};

/// Default bound on tool calls per request.
pub const DEFAULT_MAX_STEPS: usize = 6;

/// Everything a request produces: the answer, the extracted verdict, and
/// the full transcript for debugging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: String,
    pub risk_verdict: Option<RiskVerdict>,
    pub transcript: Transcript,
}

/// The loop that turns one query into one report.
///
/// The policy chooses, the registry executes, the transcript remembers.
/// Tool failures are recorded as observations and the policy decides what
/// to do about them; only a policy error aborts the request.
pub struct ReasoningLoop {
    policy: Arc<dyn DecisionPolicy>,
    registry: Arc<ToolRegistry>,
    summarizer: Arc<dyn Summarizer>,
    max_steps: usize,
}

impl ReasoningLoop {
    pub fn new(policy: Arc<dyn DecisionPolicy>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            policy,
            registry,
            summarizer: Arc::new(TranscriptSummarizer::new()),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the maximum number of tool calls per request. Never below one.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Run one request to completion.
    ///
    /// Always returns a report unless the policy itself fails; a transcript
    /// full of failed observations still summarizes (to the
    /// insufficient-data message).
    pub async fn run(&self, query: Query) -> Result<RunReport> {
        info!(
            city = %query.city,
            policy = self.policy.name(),
            max_steps = self.max_steps,
            "Reasoning loop starting"
        );

        let mut transcript = Transcript::new(query.clone(), self.max_steps);
        let mut final_answer: Option<String> = None;

        loop {
            if transcript.is_full() {
                warn!(
                    steps = transcript.len(),
                    "Step budget exhausted, forcing finish"
                );
                break;
            }

            let decision = self.policy.decide(&query, &transcript).await?;

            match decision {
                Decision::Finish { answer } => {
                    debug!(steps = transcript.len(), "Policy finished");
                    final_answer = answer;
                    break;
                }
                Decision::Call(call) => {
                    debug!(
                        tool = %call.name,
                        step = transcript.len() + 1,
                        "Executing tool call"
                    );
                    let start = std::time::Instant::now();
                    let result = self.registry.invoke(&call).await;
                    let duration_ms = start.elapsed().as_millis() as u64;

                    if result.is_success() {
                        debug!(tool = %call.name, duration_ms, "Tool call succeeded");
                    } else {
                        warn!(
                            tool = %call.name,
                            duration_ms,
                            observation = %result.describe(),
                            "Tool call failed"
                        );
                    }
                    transcript.record(call, result);
                }
            }
        }

        let summary = self
            .summarizer
            .summarize(&query, &transcript, final_answer.as_deref());
        let risk_verdict = extract_verdict(&transcript);

        info!(
            steps = transcript.len(),
            successes = transcript.success_count(),
            verdict = risk_verdict
                .as_ref()
                .map(|v| v.category.label())
                .unwrap_or("none"),
            "Reasoning loop completed"
        );

        Ok(RunReport {
            summary,
            risk_verdict,
            transcript,
        })
    }
}

/// Pull the most recent risk verdict out of the transcript, if any.
fn extract_verdict(transcript: &Transcript) -> Option<RiskVerdict> {
    let payload = transcript.payload_of(CITY_RISK_TOOL_NAME)?;
    let verdict = payload.get("verdict")?;
    serde_json::from_value(verdict.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use citypulse_core::error::{Error, PolicyError, ToolError};
    use citypulse_core::tool::{Tool, ToolCall};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays a fixed decision script; errors once the script runs out.
    struct ScriptedPolicy {
        decisions: Mutex<VecDeque<Decision>>,
    }

    impl ScriptedPolicy {
        fn new(decisions: Vec<Decision>) -> Self {
            Self {
                decisions: Mutex::new(decisions.into()),
            }
        }
    }

    #[async_trait]
    impl DecisionPolicy for ScriptedPolicy {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn decide(
            &self,
            _query: &Query,
            _transcript: &Transcript,
        ) -> std::result::Result<Decision, PolicyError> {
            self.decisions
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| PolicyError::MalformedDecision("script exhausted".into()))
        }
    }

    /// Always asks for one more echo call.
    struct NeverFinish;

    #[async_trait]
    impl DecisionPolicy for NeverFinish {
        fn name(&self) -> &str {
            "never-finish"
        }

        async fn decide(
            &self,
            _query: &Query,
            _transcript: &Transcript,
        ) -> std::result::Result<Decision, PolicyError> {
            Ok(Decision::Call(ToolCall::new("echo_tool", json!({"n": 1}))))
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo_tool"
        }

        fn description(&self) -> &str {
            "Echoes its arguments"
        }

        fn input_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }

        fn output_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }

        fn provider_id(&self) -> &str {
            "test"
        }

        async fn run(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<serde_json::Value, ToolError> {
            Ok(arguments)
        }
    }

    fn echo_registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new(Duration::from_secs(5));
        registry.register(Box::new(EchoTool));
        Arc::new(registry)
    }

    fn echo_call() -> ToolCall {
        ToolCall::new("echo_tool", json!({"n": 1}))
    }

    #[tokio::test]
    async fn grounded_answer_becomes_the_summary() {
        let policy = Arc::new(ScriptedPolicy::new(vec![
            Decision::Call(echo_call()),
            Decision::finish_with("All clear in Cebu City."),
        ]));
        let agent = ReasoningLoop::new(policy, echo_registry());

        let report = agent.run(Query::new("Cebu City")).await.unwrap();
        assert_eq!(report.summary, "All clear in Cebu City.");
        assert_eq!(report.transcript.len(), 1);
        assert_eq!(report.transcript.success_count(), 1);
        assert!(report.risk_verdict.is_none());
    }

    #[tokio::test]
    async fn finish_without_observations_reports_insufficient_data() {
        let policy = Arc::new(ScriptedPolicy::new(vec![Decision::finish_with(
            "A very confident made-up answer.",
        )]));
        let agent = ReasoningLoop::new(policy, echo_registry());

        let report = agent.run(Query::new("Cebu City")).await.unwrap();
        assert!(report.summary.contains("Insufficient data"));
        assert!(report.transcript.is_empty());
    }

    #[tokio::test]
    async fn tool_failure_is_an_observation_not_an_abort() {
        let policy = Arc::new(ScriptedPolicy::new(vec![
            Decision::Call(ToolCall::new("no_such_tool", json!({}))),
            Decision::finish(),
        ]));
        let agent = ReasoningLoop::new(policy, echo_registry());

        let report = agent.run(Query::new("Cebu City")).await.unwrap();
        assert_eq!(report.transcript.len(), 1);
        let step = &report.transcript.steps()[0];
        assert!(!step.result.is_success());
        assert!(step.result.describe().contains("no_such_tool"));
    }

    #[tokio::test]
    async fn never_finishing_policy_is_bounded_by_max_steps() {
        let agent = ReasoningLoop::new(Arc::new(NeverFinish), echo_registry()).with_max_steps(3);

        let report = agent.run(Query::new("Cebu City")).await.unwrap();
        assert_eq!(report.transcript.len(), 3);
        assert!(report.transcript.is_full());
    }

    #[tokio::test]
    async fn policy_error_aborts_the_request() {
        let policy = Arc::new(ScriptedPolicy::new(vec![]));
        let agent = ReasoningLoop::new(policy, echo_registry());

        let err = agent.run(Query::new("Cebu City")).await.unwrap_err();
        assert!(matches!(err, Error::Policy(_)));
    }

    #[tokio::test]
    async fn verdict_is_extracted_from_the_risk_payload() {
        struct RiskStub;

        #[async_trait]
        impl Tool for RiskStub {
            fn name(&self) -> &str {
                CITY_RISK_TOOL_NAME
            }

            fn description(&self) -> &str {
                "stub"
            }

            fn input_schema(&self) -> serde_json::Value {
                json!({"type": "object"})
            }

            fn output_schema(&self) -> serde_json::Value {
                json!({"type": "object"})
            }

            fn provider_id(&self) -> &str {
                "test"
            }

            async fn run(
                &self,
                _arguments: serde_json::Value,
            ) -> std::result::Result<serde_json::Value, ToolError> {
                Ok(json!({
                    "city": "Cebu City",
                    "verdict": {
                        "category": "high",
                        "contributing_factors": ["extreme_heat"]
                    },
                    "assessment": "Risk level: high. Key factors: extreme_heat."
                }))
            }
        }

        let mut registry = ToolRegistry::new(Duration::from_secs(5));
        registry.register(Box::new(RiskStub));

        let policy = Arc::new(ScriptedPolicy::new(vec![
            Decision::Call(ToolCall::new(CITY_RISK_TOOL_NAME, json!({}))),
            Decision::finish(),
        ]));
        let agent = ReasoningLoop::new(policy, Arc::new(registry));

        let report = agent.run(Query::new("Cebu City")).await.unwrap();
        let verdict = report.risk_verdict.unwrap();
        assert_eq!(verdict.category, citypulse_core::risk::RiskCategory::High);
        assert!(verdict.contributing_factors.contains("extreme_heat"));
    }
}
