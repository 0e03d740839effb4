//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps resolver and store errors to HTTP status codes with a JSON envelope.
//! Internal error details never reach the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::resolver::ResolutionError;
use crate::store::StoreError;

/// Structured JSON error response body.
///
/// `vin` is present only for decode failures, so callers can correlate the
/// failure with the identifier they asked about.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "DECODE_FAILED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed VIN (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The upstream decoder failed (502).
    #[error("decode failed for {vin}: {message}")]
    DecodeFailed { vin: String, message: String },

    /// The upstream decoder did not answer in time (504).
    #[error("decode timed out for {vin}: {message}")]
    DecodeTimeout { vin: String, message: String },

    /// A dependency the service needs is not answering (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::DecodeFailed { .. } => (StatusCode::BAD_GATEWAY, "DECODE_FAILED"),
            Self::DecodeTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "DECODE_TIMEOUT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn vin(&self) -> Option<&str> {
        match self {
            Self::DecodeFailed { vin, .. } | Self::DecodeTimeout { vin, .. } => Some(vin),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::DecodeFailed { message, .. } | Self::DecodeTimeout { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            vin: self.vin().map(str::to_string),
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::InvalidInput(e) => Self::BadRequest(e.to_string()),
            ResolutionError::DecodeFailed { vin, source } if source.is_timeout() => {
                Self::DecodeTimeout {
                    vin: vin.into(),
                    message: source.to_string(),
                }
            }
            ResolutionError::DecodeFailed { vin, source } => Self::DecodeFailed {
                vin: vin.into(),
                message: source.to_string(),
            },
            ResolutionError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
