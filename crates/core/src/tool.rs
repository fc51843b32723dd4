//! Tool trait, the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world: fetch a
//! weather forecast, pull recent headlines, compute a risk assessment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Metadata describing a tool to the decision policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's arguments
    pub input_schema: serde_json::Value,

    /// JSON Schema describing the tool's success payload
    pub output_schema: serde_json::Value,

    /// Rate-limit identity of the provider behind this tool
    pub provider_id: String,
}

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the policy's tool_call id when LLM-driven)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Build a call with a fresh ID. Policies that receive an ID from an
    /// upstream model should construct the struct directly instead.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }
}

/// Failure classes a tool invocation can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unknown tool or arguments that do not match the input schema.
    Schema,
    /// The upstream provider failed and retries (if any) were used up.
    Provider,
    /// The local rate budget would not admit the call in time.
    RateLimit,
    /// The invocation deadline elapsed.
    Timeout,
}

/// The outcome of a tool invocation, normalized for the transcript.
///
/// Failures are observations, not faults: the reasoning loop records them
/// and the policy decides whether to try something else or finish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success {
        call_id: String,
        payload: serde_json::Value,
    },
    Failure {
        call_id: String,
        kind: FailureKind,
        message: String,
    },
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::Success {
            call_id: call_id.into(),
            payload,
        }
    }

    pub fn failure(
        call_id: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self::Failure {
            call_id: call_id.into(),
            kind,
            message: message.into(),
        }
    }

    /// Normalize a tool error into a failure observation.
    pub fn from_error(call_id: &str, err: &ToolError) -> Self {
        Self::failure(call_id, err.failure_kind(), err.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    pub fn call_id(&self) -> &str {
        match self {
            ToolResult::Success { call_id, .. } => call_id,
            ToolResult::Failure { call_id, .. } => call_id,
        }
    }

    /// The success payload, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ToolResult::Success { payload, .. } => Some(payload),
            ToolResult::Failure { .. } => None,
        }
    }

    /// One-line rendering used when the transcript is shown to a model
    /// or printed for debugging.
    pub fn describe(&self) -> String {
        match self {
            ToolResult::Success { payload, .. } => payload.to_string(),
            ToolResult::Failure { kind, message, .. } => {
                format!("failed ({:?}): {message}", kind)
            }
        }
    }
}

/// The core Tool trait.
///
/// Each tool (weather_tool, news_tool, city_risk_tool) implements this
/// trait. Tools are registered in the ToolRegistry at startup and are
/// immutable afterwards.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "weather_tool").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the decision policy).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's arguments.
    fn input_schema(&self) -> serde_json::Value;

    /// JSON Schema describing this tool's success payload.
    fn output_schema(&self) -> serde_json::Value;

    /// Rate-limit identity of the provider this tool calls out to.
    fn provider_id(&self) -> &str;

    /// Run the tool. The registry has already validated `arguments`
    /// against `input_schema`.
    async fn run(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError>;

    /// Convert this tool into a ToolSpec for the decision policy.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
            output_schema: self.output_schema(),
            provider_id: self.provider_id().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;

    #[test]
    fn tool_call_ids_are_unique() {
        let a = ToolCall::new("weather_tool", serde_json::json!({"city": "Oslo"}));
        let b = ToolCall::new("weather_tool", serde_json::json!({"city": "Oslo"}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let ok = ToolResult::success("call_1", serde_json::json!({"temp_c": 21.5}));
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains("\"status\":\"success\""));

        let bad = ToolResult::failure("call_2", FailureKind::Timeout, "deadline elapsed");
        let json = serde_json::to_string(&bad).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        assert!(json.contains("\"kind\":\"timeout\""));
    }

    #[test]
    fn from_error_carries_kind_and_message() {
        let err = ToolError::Exhausted {
            tool_name: "news_tool".into(),
            attempts: 3,
            source: AdapterError::Network("connection reset".into()),
        };
        let result = ToolResult::from_error("call_9", &err);
        match result {
            ToolResult::Failure { call_id, kind, message } => {
                assert_eq!(call_id, "call_9");
                assert_eq!(kind, FailureKind::Provider);
                assert!(message.contains("3 attempts"));
            }
            ToolResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn payload_only_on_success() {
        let ok = ToolResult::success("c", serde_json::json!({"items": []}));
        assert!(ok.payload().is_some());

        let bad = ToolResult::failure("c", FailureKind::Provider, "boom");
        assert!(bad.payload().is_none());
        assert!(!bad.is_success());
    }
}
