//! The tool registry: lookup, validation, deadline, normalization.
//!
//! `invoke` is the single entry point the reasoning loop calls. It never
//! panics and never leaks a raw error: every outcome becomes a
//! [`ToolResult`] observation the policy can read. The pipeline:
//!
//! 1. unknown tool name -> Schema failure, nothing runs
//! 2. arguments checked against the input schema -> Schema failure
//!    before any network I/O
//! 3. the tool runs under this registry's per-invocation deadline
//! 4. success payloads are checked against the tool's output schema
//!
//! Retries and rate limiting are not here; they live inside the tools,
//! which share a [`citypulse_resilience::RetryExecutor`].

use std::collections::HashMap;
use std::time::Duration;

use citypulse_core::error::ToolError;
use citypulse_core::tool::{Tool, ToolCall, ToolResult, ToolSpec};
use tracing::{debug, warn};

use crate::schema;

pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    step_timeout: Duration,
}

impl ToolRegistry {
    pub fn new(step_timeout: Duration) -> Self {
        Self {
            tools: HashMap::new(),
            step_timeout,
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Specs of every registered tool, for handing to a decision policy.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Execute a tool call and normalize the outcome.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.get(&call.name) else {
            debug!(tool = %call.name, "unknown tool requested");
            return ToolResult::from_error(&call.id, &ToolError::NotFound(call.name.clone()));
        };

        if let Err(reason) = schema::validate(&tool.input_schema(), &call.arguments) {
            debug!(tool = %call.name, %reason, "arguments rejected");
            return ToolResult::from_error(
                &call.id,
                &ToolError::Schema {
                    tool_name: call.name.clone(),
                    reason,
                },
            );
        }

        debug!(tool = %call.name, call_id = %call.id, "invoking");
        let outcome = tokio::time::timeout(self.step_timeout, tool.run(call.arguments.clone()));
        let payload = match outcome.await {
            Err(_) => {
                warn!(tool = %call.name, timeout_secs = self.step_timeout.as_secs(), "deadline elapsed");
                return ToolResult::from_error(
                    &call.id,
                    &ToolError::Timeout {
                        tool_name: call.name.clone(),
                        timeout_secs: self.step_timeout.as_secs(),
                    },
                );
            }
            Ok(Err(err)) => {
                warn!(tool = %call.name, error = %err, "invocation failed");
                return ToolResult::from_error(&call.id, &err);
            }
            Ok(Ok(payload)) => payload,
        };

        if let Err(reason) = schema::validate(&tool.output_schema(), &payload) {
            warn!(tool = %call.name, %reason, "payload violates output schema");
            return ToolResult::from_error(
                &call.id,
                &ToolError::Schema {
                    tool_name: call.name.clone(),
                    reason: format!("output schema violation: {reason}"),
                },
            );
        }

        ToolResult::success(&call.id, payload)
    }
}
