//! LLM-backed decision policy.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (OpenRouter,
//! OpenAI, Ollama, vLLM, ...) with tool definitions attached. Each `decide`
//! call replays the transcript as a message history, so the endpoint sees
//! every observation, failed ones included, and picks the next step.

use async_trait::async_trait;
use citypulse_core::error::PolicyError;
use citypulse_core::policy::{Decision, DecisionPolicy};
use citypulse_core::query::Query;
use citypulse_core::tool::{ToolCall, ToolSpec};
use citypulse_core::transcript::Transcript;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::prompts;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// A decision policy backed by an OpenAI-compatible chat endpoint.
pub struct LlmPolicy {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    tools: Vec<ToolSpec>,
    client: reqwest::Client,
}

impl LlmPolicy {
    /// Create a policy for any OpenAI-compatible endpoint.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        tools: Vec<ToolSpec>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
            tools,
            client,
        }
    }

    /// Create an OpenRouter policy (convenience constructor).
    pub fn openrouter(
        api_key: impl Into<String>,
        model: impl Into<String>,
        tools: Vec<ToolSpec>,
    ) -> Self {
        Self::new("https://openrouter.ai/api/v1", api_key, model, tools)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replay the query and transcript as an OpenAI message history.
    fn to_api_messages(&self, query: &Query, transcript: &Transcript) -> Vec<ApiMessage> {
        let mut messages = vec![
            ApiMessage {
                role: "system".into(),
                content: Some(prompts::SYSTEM_PROMPT.to_string()),
                tool_calls: None,
                tool_call_id: None,
            },
            ApiMessage {
                role: "user".into(),
                content: Some(prompts::user_prompt(query)),
                tool_calls: None,
                tool_call_id: None,
            },
        ];

        for step in transcript.steps() {
            messages.push(ApiMessage {
                role: "assistant".into(),
                content: None,
                tool_calls: Some(vec![ApiToolCall {
                    id: step.call.id.clone(),
                    r#type: "function".into(),
                    function: ApiFunction {
                        name: step.call.name.clone(),
                        arguments: step.call.arguments.to_string(),
                    },
                }]),
                tool_call_id: None,
            });
            messages.push(ApiMessage {
                role: "tool".into(),
                content: Some(step.result.describe()),
                tool_calls: None,
                tool_call_id: Some(step.call.id.clone()),
            });
        }

        messages
    }

    /// Convert tool specs to OpenAI API format.
    fn to_api_tools(tools: &[ToolSpec]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                },
            })
            .collect()
    }

    /// Turn the endpoint's first choice into a loop decision.
    fn decision_from(response: ApiResponse) -> std::result::Result<Decision, PolicyError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PolicyError::MalformedDecision("no choices in response".into()))?;

        let tool_call = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .next();

        if let Some(tc) = tool_call {
            if tc.function.name.is_empty() {
                return Err(PolicyError::MalformedDecision(
                    "tool call without a tool name".into(),
                ));
            }
            let arguments: serde_json::Value =
                serde_json::from_str(&tc.function.arguments).map_err(|e| {
                    PolicyError::MalformedDecision(format!(
                        "tool call arguments are not valid JSON: {e}"
                    ))
                })?;
            let call = if tc.id.is_empty() {
                ToolCall::new(tc.function.name, arguments)
            } else {
                ToolCall {
                    id: tc.id,
                    name: tc.function.name,
                    arguments,
                }
            };
            return Ok(Decision::Call(call));
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(Decision::finish_with(content)),
            _ => Ok(Decision::finish()),
        }
    }
}

#[async_trait]
impl DecisionPolicy for LlmPolicy {
    fn name(&self) -> &str {
        "llm"
    }

    async fn decide(
        &self,
        query: &Query,
        transcript: &Transcript,
    ) -> std::result::Result<Decision, PolicyError> {
        if self.api_key.is_empty() {
            return Err(PolicyError::NotConfigured(
                "chat completions API key is empty".into(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": self.to_api_messages(query, transcript),
            "temperature": self.temperature,
            "stream": false,
            "tools": Self::to_api_tools(&self.tools),
        });

        debug!(
            model = %self.model,
            steps = transcript.len(),
            "Requesting next decision"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PolicyError::Timeout(e.to_string())
                } else {
                    PolicyError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            return Err(PolicyError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Chat endpoint returned error");
            return Err(PolicyError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            PolicyError::MalformedDecision(format!("Failed to parse response: {e}"))
        })?;

        Self::decision_from(api_response)
    }
}

// --- Chat API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}
