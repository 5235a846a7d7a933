//! Provider error types.

use thiserror::Error;

/// Errors that can occur when asking a backend for a fun fact.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The API answered but carried no text.
    #[error("{0} returned no text")]
    EmptyResponse(String),
}

impl ProviderError {
    /// Map a reqwest send failure.
    pub(crate) fn from_send(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

/// Turn a non-success HTTP status into a [`ProviderError`].
///
/// `extract_message` pulls the human-readable message out of the provider's
/// JSON error body; the raw body is used when it returns `None`.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
    extract_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 404 {
        return Err(ProviderError::ModelNotFound(model.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);
    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(message));
    }
    Err(ProviderError::ApiError { status, message })
}
