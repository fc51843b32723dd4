//! # CityPulse Policy
//!
//! `DecisionPolicy` implementations for the reasoning loop.
//!
//! Two policies ship here:
//! - [`LlmPolicy`] asks an OpenAI-compatible chat-completions endpoint to
//!   pick the next tool call, sending the tool schemas and the transcript
//!   so far. This is the production path.
//! - [`RulePolicy`] walks a fixed weather, news, risk sequence and then
//!   finishes. No network, fully deterministic, used offline and in tests.
//!
//! Both see the same inputs (immutable query, transcript so far) and emit
//! the same `Decision`, so the loop cannot tell them apart.

pub mod llm;
pub mod prompts;
pub mod rules;

pub use llm::LlmPolicy;
pub use rules::RulePolicy;
