//! Shared request plumbing for the provider adapters.

use citypulse_core::error::AdapterError;
use serde::de::DeserializeOwned;
use tracing::warn;

pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 10;

pub(crate) fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

/// Classify a transport-level failure.
pub(crate) fn request_error(err: reqwest::Error) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout(err.to_string())
    } else {
        AdapterError::Network(err.to_string())
    }
}

/// Map the status line, then deserialize the body.
///
/// 429 becomes `RateLimited` so the retry layer backs off; any other
/// non-200 carries the status and body for classification there.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, AdapterError> {
    let status = response.status().as_u16();

    if status == 429 {
        return Err(AdapterError::RateLimited {
            retry_after_secs: 5,
        });
    }

    if status != 200 {
        let body = response.text().await.unwrap_or_default();
        warn!(status, context, body = %body, "provider returned error");
        return Err(AdapterError::ApiError {
            status_code: status,
            message: body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AdapterError::InvalidResponse(format!("{context}: {e}")))
}
