//! Decoder client configuration.
//!
//! Selects the decoder profile, its base URL, the optional credential pair,
//! and the request timeout. Defaults point to production endpoints. Override
//! via environment variables or explicit construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

use crate::profile::DecoderProfile;

/// Default decoder request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;

/// Default header carrying the username.
pub const DEFAULT_USER_HEADER: &str = "UserName";

/// Default header carrying the password. The REST sample uses lowercase;
/// the SOAP binding uses `Password`. Override via `DECODER_PASS_HEADER`.
pub const DEFAULT_PASS_HEADER: &str = "password";

/// Username/password pair sent as two fixed headers on every decode.
#[derive(Clone)]
pub struct Credentials {
    /// Account name, sent in the clear.
    pub username: String,
    /// Secret, zeroized on drop and redacted from `Debug`.
    pub password: Zeroizing<String>,
}

impl Credentials {
    /// Build a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for connecting to an external VIN decoder.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Response shape and URL layout.
    pub profile: DecoderProfile,
    /// Base URL the profile path is appended to.
    pub base_url: Url,
    /// Credentials, if the decoder requires them.
    pub credentials: Option<Credentials>,
    /// Header name carrying the username.
    pub user_header: String,
    /// Header name carrying the password.
    pub pass_header: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl DecoderConfig {
    /// Configuration for `profile` against its production base URL, no
    /// credentials, and default header names and timeout.
    pub fn for_profile(profile: DecoderProfile) -> Result<Self, ConfigError> {
        Ok(Self {
            profile,
            base_url: parse_url("base_url", profile.default_base_url())?,
            credentials: None,
            user_header: DEFAULT_USER_HEADER.to_string(),
            pass_header: DEFAULT_PASS_HEADER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DECODER_PROFILE` (default: `nhtsa`; also `jdpower`)
    /// - `DECODER_BASE_URL` or `JDP_BASE_URL` (default: the profile's production URL)
    /// - `DECODER_USER` or `JDP_USER`, `DECODER_PASS` or `JDP_PASS` (optional)
    /// - `DECODER_USER_HEADER` (default: `UserName`)
    /// - `DECODER_PASS_HEADER` (default: `password`)
    /// - `DECODER_TIMEOUT_SECS` (default: 12)
    ///
    /// Missing credentials are a warning, not an error: some decoders are
    /// unauthenticated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |primary: &str, alias: Option<&str>| -> Option<String> {
            lookup(primary)
                .or_else(|| alias.and_then(&lookup))
                .filter(|v| !v.trim().is_empty())
        };

        let profile: DecoderProfile = match var("DECODER_PROFILE", None) {
            Some(raw) => raw.parse()?,
            None => DecoderProfile::Nhtsa,
        };

        let base_url = match var("DECODER_BASE_URL", Some("JDP_BASE_URL")) {
            Some(raw) => parse_url("DECODER_BASE_URL", &raw)?,
            None => parse_url("base_url", profile.default_base_url())?,
        };

        let credentials = match (
            var("DECODER_USER", Some("JDP_USER")),
            var("DECODER_PASS", Some("JDP_PASS")),
        ) {
            (Some(user), Some(pass)) => Some(Credentials::new(user, pass)),
            _ => {
                tracing::warn!(
                    profile = %profile,
                    "DECODER_USER or DECODER_PASS not set; decoder requests will be unauthenticated"
                );
                None
            }
        };

        let user_header =
            var("DECODER_USER_HEADER", None).unwrap_or_else(|| DEFAULT_USER_HEADER.to_string());
        let pass_header =
            var("DECODER_PASS_HEADER", None).unwrap_or_else(|| DEFAULT_PASS_HEADER.to_string());
        validate_header_name(&user_header)?;
        validate_header_name(&pass_header)?;

        let timeout_secs = match var("DECODER_TIMEOUT_SECS", None) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            profile,
            base_url,
            credentials,
            user_header,
            pass_header,
            timeout_secs,
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str, profile: DecoderProfile) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            timeout_secs: 5,
            ..Self::for_profile(profile)?
        })
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("{raw} is not an http(s) base URL"),
        ));
    }
    Ok(url)
}

fn validate_header_name(name: &str) -> Result<(), ConfigError> {
    reqwest::header::HeaderName::from_bytes(name.as_bytes())
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A base URL failed to parse or is not http(s). Holds the variable name
    /// and the reason.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// `DECODER_PROFILE` names no known profile.
    #[error("unknown decoder profile {0:?} (expected `nhtsa` or `jdpower`)")]
    UnknownProfile(String),
    /// A credential header name is not a valid HTTP header name.
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
    /// A credential contains bytes not allowed in a header value. Holds the
    /// header name, never the value.
    #[error("invalid header value for {0}")]
    InvalidHeaderValue(String),
    /// `DECODER_TIMEOUT_SECS` is not a positive integer.
    #[error("invalid DECODER_TIMEOUT_SECS value {0:?}")]
    InvalidTimeout(String),
}
