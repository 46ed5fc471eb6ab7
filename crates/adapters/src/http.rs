//! Shared HTTP plumbing for the gateway clients.
//!
//! Mirrors the response handling every adapter needs: non-2xx statuses are
//! carried as `{status, body}` pairs for debugging, successful bodies are
//! decoded into the expected type.

use serde::de::DeserializeOwned;

use crate::error::ErrorKind;

/// Transport-level failure shared by all adapter error enums.
#[derive(Debug, thiserror::Error)]
pub enum HttpFailure {
    /// The HTTP request itself failed (network, DNS, TLS, timeout) or the
    /// body could not be decoded.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("gateway error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl HttpFailure {
    /// Classify this failure for the orchestrator's step trace.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Request(e) if e.is_decode() => ErrorKind::InvalidResponse,
            Self::Request(_) => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Service,
        }
    }
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`HttpFailure::Api`] containing the status
/// and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, HttpFailure> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(HttpFailure::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, HttpFailure> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_failure_classifies_as_service() {
        let failure = HttpFailure::Api {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(failure.kind(), ErrorKind::Service);
    }

    #[test]
    fn api_failure_displays_status_and_body() {
        let failure = HttpFailure::Api {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(failure.to_string(), "gateway error (500): boom");
    }
}
