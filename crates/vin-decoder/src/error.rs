//! Decoder client error types.

/// Errors from a decode attempt.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The VIN was rejected before any network I/O.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] vin_core::ValidationError),
    /// HTTP transport error (connection refused, DNS, TLS, reset).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The request exceeded the configured timeout.
    #[error("decoder {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },
    /// Decoder returned a non-2xx status.
    #[error("decoder {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body was not valid JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Response was JSON but not in the shape the profile expects.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
    /// Decoder answered but reported a non-affirmative business status.
    #[error("decoder reported no match: {status}")]
    NoMatch { status: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl DecodeError {
    /// Whether this failure was the request deadline elapsing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The upstream HTTP status, if the decoder answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
