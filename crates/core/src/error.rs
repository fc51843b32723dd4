//! Error types for the CityPulse domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; `Error` is the union the
//! outermost layers report.

use thiserror::Error;

use crate::tool::FailureKind;

/// The top-level error type for CityPulse operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Adapter errors ---
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Decision policy errors ---
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the external data providers (weather, news, geocoding).
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Place not found: {0}")]
    PlaceNotFound(String),

    #[error("Adapter not configured: {0}")]
    NotConfigured(String),
}

impl AdapterError {
    /// Whether another attempt has any chance of succeeding.
    ///
    /// Transient transport failures, provider-side throttling, and 5xx
    /// responses are worth retrying. Client-side mistakes (bad request,
    /// bad key, unknown place, unparseable body) are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::Timeout(_) | AdapterError::Network(_) => true,
            AdapterError::RateLimited { .. } => true,
            AdapterError::ApiError { status_code, .. } => {
                *status_code == 429 || *status_code >= 500
            }
            AdapterError::InvalidResponse(_)
            | AdapterError::PlaceNotFound(_)
            | AdapterError::NotConfigured(_) => false,
        }
    }
}

/// Errors from tool lookup and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool_name}: {reason}")]
    Schema { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Rate budget exhausted for provider: {provider}")]
    RateLimitExceeded { provider: String },

    #[error("All {attempts} attempts failed for {tool_name}: {source}")]
    Exhausted {
        tool_name: String,
        attempts: u32,
        source: AdapterError,
    },

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ToolError {
    /// Collapse the error into the failure class recorded on the transcript.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ToolError::NotFound(_) | ToolError::Schema { .. } => FailureKind::Schema,
            ToolError::Timeout { .. } => FailureKind::Timeout,
            ToolError::RateLimitExceeded { .. } => FailureKind::RateLimit,
            ToolError::Exhausted { .. } => FailureKind::Provider,
            ToolError::Adapter(err) => match err {
                AdapterError::Timeout(_) => FailureKind::Timeout,
                AdapterError::RateLimited { .. } => FailureKind::RateLimit,
                _ => FailureKind::Provider,
            },
        }
    }
}

/// Errors from the decision policy (the component choosing the next step).
///
/// These are the only errors that abort a request outright: a policy that
/// cannot decide leaves the loop with nothing to do.
#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed decision: {0}")]
    MalformedDecision(String),

    #[error("Policy not configured: {0}")]
    NotConfigured(String),
}
