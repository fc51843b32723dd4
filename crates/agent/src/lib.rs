//! # CityPulse Agent
//!
//! The reasoning loop at the heart of CityPulse.
//!
//! Each request follows a Choose, Act, Observe cycle:
//!
//! 1. The `DecisionPolicy` reads the query and the transcript so far
//! 2. If it chose a tool call, the `ToolRegistry` executes it
//! 3. The observation (success or failure) is appended to the transcript
//! 4. Back to step 1, until the policy finishes or the step budget runs out
//!
//! The loop itself never talks to a provider and never retries anything;
//! resilience lives one layer down, inside the tools. When the loop stops,
//! the [`Summarizer`] turns the transcript into the final one-paragraph
//! answer.

pub mod loop_runner;
pub mod summarizer;

pub use loop_runner::{ReasoningLoop, RunReport};
pub use summarizer::{Summarizer, TranscriptSummarizer};
