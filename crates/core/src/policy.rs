//! DecisionPolicy trait, the abstraction over "what should the agent do
//! next".
//!
//! The reasoning loop is deliberately dumb: it executes whatever the policy
//! decides and records the outcome. The policy sees the full transcript
//! (including failures) on every call, so it can route around a broken
//! provider or give up gracefully. Implementations: LLM-backed tool
//! calling, deterministic rules, scripted test doubles.

use async_trait::async_trait;

use crate::error::PolicyError;
use crate::query::Query;
use crate::tool::ToolCall;
use crate::transcript::Transcript;

/// What the policy wants the loop to do next.
#[derive(Debug, Clone)]
pub enum Decision {
    /// Execute this tool call and come back with the observation.
    Call(ToolCall),

    /// Stop reasoning. `answer` carries the policy's own final text when it
    /// has one (LLM policies do); `None` defers entirely to the summarizer.
    Finish { answer: Option<String> },
}

impl Decision {
    pub fn finish() -> Self {
        Decision::Finish { answer: None }
    }

    pub fn finish_with(answer: impl Into<String>) -> Self {
        Decision::Finish {
            answer: Some(answer.into()),
        }
    }
}

/// The core DecisionPolicy trait.
///
/// `decide` is called once per loop step with the immutable query and the
/// transcript so far. Policies learn which tools exist at construction
/// time and hold no per-request state of their own; everything they need
/// to know about the request lives in the transcript.
#[async_trait]
pub trait DecisionPolicy: Send + Sync {
    /// A human-readable name for this policy (e.g., "llm", "rules").
    fn name(&self) -> &str;

    /// Choose the next step. Errors here abort the whole request.
    async fn decide(
        &self,
        query: &Query,
        transcript: &Transcript,
    ) -> std::result::Result<Decision, PolicyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFinish;

    #[async_trait]
    impl DecisionPolicy for AlwaysFinish {
        fn name(&self) -> &str {
            "always-finish"
        }

        async fn decide(
            &self,
            _query: &Query,
            _transcript: &Transcript,
        ) -> std::result::Result<Decision, PolicyError> {
            Ok(Decision::finish())
        }
    }

    #[tokio::test]
    async fn policy_trait_is_object_safe() {
        let policy: Box<dyn DecisionPolicy> = Box::new(AlwaysFinish);
        let query = Query::new("Lisbon");
        let transcript = Transcript::new(query.clone(), 4);
        let decision = policy.decide(&query, &transcript).await.unwrap();
        assert!(matches!(decision, Decision::Finish { answer: None }));
    }

    #[test]
    fn finish_constructors() {
        assert!(matches!(Decision::finish(), Decision::Finish { answer: None }));
        match Decision::finish_with("all clear") {
            Decision::Finish { answer } => assert_eq!(answer.as_deref(), Some("all clear")),
            Decision::Call(_) => panic!("expected finish"),
        }
    }
}
