//! Transcript, the bounded record of one request's tool interactions.
//!
//! The transcript is the loop's single source of truth: the policy reads it
//! to decide the next step, the summarizer reads it to produce the answer,
//! and it is dropped once the answer is out. Nothing here survives the
//! request.

use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::tool::{ToolCall, ToolResult};

/// One completed step: the call that was issued and what came back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptStep {
    pub call: ToolCall,
    pub result: ToolResult,
}

/// Ordered, bounded log of tool calls and their observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    query: Query,
    steps: Vec<TranscriptStep>,
    max_steps: usize,
}

impl Transcript {
    pub fn new(query: Query, max_steps: usize) -> Self {
        Self {
            query,
            steps: Vec::new(),
            max_steps,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Append a step. Returns `false` (and drops the step) once the bound
    /// is reached; the loop checks `is_full` before issuing a call, so a
    /// `false` here means a caller skipped that check.
    pub fn record(&mut self, call: ToolCall, result: ToolResult) -> bool {
        if self.is_full() {
            tracing::warn!(
                tool = %call.name,
                max_steps = self.max_steps,
                "transcript full, dropping step"
            );
            return false;
        }
        self.steps.push(TranscriptStep { call, result });
        true
    }

    pub fn steps(&self) -> &[TranscriptStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.steps.len() >= self.max_steps
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Steps whose result was a success.
    pub fn successes(&self) -> impl Iterator<Item = &TranscriptStep> {
        self.steps.iter().filter(|s| s.result.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    /// Whether a tool has been called at least once, regardless of outcome.
    pub fn has_called(&self, tool_name: &str) -> bool {
        self.steps.iter().any(|s| s.call.name == tool_name)
    }

    /// The most recent successful payload produced by the named tool.
    pub fn payload_of(&self, tool_name: &str) -> Option<&serde_json::Value> {
        self.steps
            .iter()
            .rev()
            .filter(|s| s.call.name == tool_name)
            .find_map(|s| s.result.payload())
    }

    pub fn latest(&self) -> Option<&TranscriptStep> {
        self.steps.last()
    }

    /// Render the transcript as a human-readable text section suitable for
    /// injection into a model prompt or a debug dump.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Query: {}\n", self.query.describe()));
        if !self.steps.is_empty() {
            out.push_str("\n## Steps So Far\n");
            for (i, step) in self.steps.iter().enumerate() {
                out.push_str(&format!(
                    "{}. [Action] {}({})\n",
                    i + 1,
                    step.call.name,
                    step.call.arguments
                ));
                out.push_str(&format!("   [Observation] {}\n", step.result.describe()));
            }
        }
        out.push_str(&format!("\nSteps used: {}/{}\n", self.len(), self.max_steps));
        out
    }
}
