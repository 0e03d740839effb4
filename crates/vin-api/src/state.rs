//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds the resolver (which owns the store and
//! decoder handles) and the server configuration. No per-request state
//! outlives the request.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::resolver::Resolver;
use crate::store::VehicleStore;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default per-request server timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Server configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Upper bound on a single request, including any decode it triggers.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Invalid server configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AppConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("REQUEST_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidRequestTimeout(String),

    #[error(
        "REQUEST_TIMEOUT_SECS ({request_secs}) must be greater than DECODER_TIMEOUT_SECS ({decoder_secs})"
    )]
    RequestTimeoutNotAboveDecoder { request_secs: u64, decoder_secs: u64 },
}

impl AppConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(AppConfigError::InvalidRequestTimeout(raw)),
            },
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check that a request outlives the decoder call it may trigger.
    ///
    /// Otherwise the server timeout fires first and a slow decoder surfaces
    /// as a bare timeout instead of a `DECODE_TIMEOUT` error.
    pub fn ensure_covers_decoder(&self, decoder_timeout_secs: u64) -> Result<(), AppConfigError> {
        if self.request_timeout_secs > decoder_timeout_secs {
            Ok(())
        } else {
            Err(AppConfigError::RequestTimeoutNotAboveDecoder {
                request_secs: self.request_timeout_secs,
                decoder_secs: decoder_timeout_secs,
            })
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(resolver: Resolver, config: AppConfig) -> Self {
        Self {
            resolver,
            config: Arc::new(config),
        }
    }

    /// The store behind the resolver.
    pub fn store(&self) -> &Arc<dyn VehicleStore> {
        self.resolver.store()
    }
}
