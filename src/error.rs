//! Failure type surfaced through every contract.

/// Errors that can occur while executing a request or decoding its result.
///
/// Every transport-level problem is folded into this type at the executor
/// boundary, so consumers only ever see the failure branch of a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Retries exhausted after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    #[error("No async runtime available to run the request")]
    NoRuntime,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Upstream HTTP status, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let api = |status| ClientError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_retryable());
        assert!(api(500).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!api(404).is_retryable());
        assert!(ClientError::Timeout.is_retryable());
        assert!(!ClientError::Decode("bad".into()).is_retryable());
        assert!(!ClientError::NoRuntime.is_retryable());
    }

    #[test]
    fn test_status_extraction() {
        let err = ClientError::Api {
            status: 418,
            message: "teapot".into(),
        };
        assert_eq!(err.status(), Some(418));
        assert_eq!(ClientError::Timeout.status(), None);
    }

    #[test]
    fn test_display_messages() {
        let err = ClientError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "API error (502): bad gateway");

        let err = ClientError::RetriesExhausted {
            attempts: 3,
            message: "Request timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "Retries exhausted after 3 attempts: Request timed out"
        );
    }

    #[test]
    fn test_from_json_error_is_decode() {
        let err: ClientError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
