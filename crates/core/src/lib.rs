//! # CityPulse Core
//!
//! Domain types, traits, and error definitions for the CityPulse reasoning
//! agent. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod adapter;
pub mod error;
pub mod news;
pub mod policy;
pub mod query;
pub mod risk;
pub mod tool;
pub mod transcript;
pub mod weather;

// Re-export key types at crate root for ergonomics
pub use adapter::{NewsAdapter, WeatherAdapter};
pub use error::{AdapterError, Error, PolicyError, Result, ToolError};
pub use news::{Headline, NewsQuery};
pub use policy::{Decision, DecisionPolicy};
pub use query::Query;
pub use risk::{Hazard, HazardSet, RiskCategory, RiskVerdict};
pub use tool::{FailureKind, Tool, ToolCall, ToolResult, ToolSpec};
pub use transcript::{Transcript, TranscriptStep};
pub use weather::{CurrentConditions, DailyOutlook, Horizon, WeatherQuery, WeatherSnapshot};
