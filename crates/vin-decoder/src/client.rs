//! HTTP client for the configured external decoder.
//!
//! One `reqwest::Client` per decoder, built once with the request timeout
//! and credential headers baked in. Safe to share via `Arc` across tasks.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use vin_core::{DecodedPayload, Vin};

use crate::config::{ConfigError, DecoderConfig};
use crate::error::DecodeError;
use crate::profile::DecoderProfile;
use crate::VinDecoder;

/// Upstream error bodies are truncated to this many characters.
const ERROR_BODY_LIMIT: usize = 512;

/// Typed client for one external VIN decoder.
#[derive(Debug, Clone)]
pub struct DecoderClient {
    http: reqwest::Client,
    profile: DecoderProfile,
    base_url: url::Url,
    timeout: Duration,
}

impl DecoderClient {
    /// Create a new decoder client from configuration.
    pub fn new(config: DecoderConfig) -> Result<Self, DecodeError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(auth_headers(&config)?)
            .build()
            .map_err(|e| DecodeError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            profile: config.profile,
            base_url: config.base_url,
            timeout,
        })
    }

    /// Decode from an unvalidated string.
    ///
    /// Returns [`DecodeError::InvalidInput`] for an empty VIN before any
    /// network I/O.
    pub async fn decode_str(&self, vin: &str) -> Result<DecodedPayload, DecodeError> {
        let vin = Vin::new(vin)?;
        self.decode_vin(&vin).await
    }

    /// Issue a single decode request for `vin`. No retries.
    pub async fn decode_vin(&self, vin: &Vin) -> Result<DecodedPayload, DecodeError> {
        let url = self.profile.request_url(&self.base_url, vin)?;
        let endpoint = format!("GET {}", url.path());
        let started = Instant::now();

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp.text().await, &endpoint);
            tracing::warn!(
                vin = %vin,
                endpoint = %endpoint,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "decoder returned non-success status"
            );
            return Err(DecodeError::ApiError {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error(&endpoint)
            } else {
                DecodeError::Deserialization {
                    endpoint: endpoint.clone(),
                    source: e,
                }
            }
        })?;

        let decoded = self.profile.extract(body, &endpoint)?;
        tracing::debug!(
            vin = %vin,
            profile = %self.profile,
            fields = decoded.entry.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "decoder call succeeded"
        );
        Ok(decoded)
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> DecodeError {
        if e.is_timeout() {
            self.timeout_error(endpoint)
        } else {
            DecodeError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            }
        }
    }

    fn timeout_error(&self, endpoint: &str) -> DecodeError {
        DecodeError::Timeout {
            endpoint: endpoint.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}

#[async_trait]
impl VinDecoder for DecoderClient {
    fn name(&self) -> &str {
        self.profile.as_str()
    }

    async fn decode(&self, vin: &Vin) -> Result<DecodedPayload, DecodeError> {
        self.decode_vin(vin).await
    }
}

/// Credential headers, or an empty map when no credentials are configured.
fn auth_headers(config: &DecoderConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    let Some(creds) = &config.credentials else {
        return Ok(headers);
    };

    let user_name = HeaderName::from_bytes(config.user_header.as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(config.user_header.clone()))?;
    let pass_name = HeaderName::from_bytes(config.pass_header.as_bytes())
        .map_err(|_| ConfigError::InvalidHeaderName(config.pass_header.clone()))?;

    let user_value = HeaderValue::from_str(&creds.username)
        .map_err(|_| ConfigError::InvalidHeaderValue(config.user_header.clone()))?;
    let mut pass_value = HeaderValue::from_str(creds.password.as_str())
        .map_err(|_| ConfigError::InvalidHeaderValue(config.pass_header.clone()))?;
    pass_value.set_sensitive(true);

    headers.insert(user_name, user_value);
    headers.insert(pass_name, pass_value);
    Ok(headers)
}

/// Excerpt of a non-success response body. A body that cannot be read is
/// reported in its place.
fn error_body(read: Result<String, reqwest::Error>, endpoint: &str) -> String {
    match read {
        Ok(body) => excerpt(&body),
        Err(e) => {
            tracing::debug!(endpoint = %endpoint, error = %e, "failed to read error body");
            format!("<unreadable body: {e}>")
        }
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;

    #[test]
    fn no_credentials_means_no_headers() {
        let cfg = DecoderConfig::for_profile(DecoderProfile::Nhtsa).unwrap();
        assert!(auth_headers(&cfg).unwrap().is_empty());
    }

    #[test]
    fn credentials_use_configured_header_names() {
        let mut cfg = DecoderConfig::for_profile(DecoderProfile::JdPower).unwrap();
        cfg.credentials = Some(Credentials::new("dealer", "s3cret"));
        cfg.pass_header = "Password".into();
        let headers = auth_headers(&cfg).unwrap();
        assert_eq!(headers.get("UserName").unwrap(), "dealer");
        // Header lookup is case-insensitive; the configured casing is what goes on the wire.
        assert_eq!(headers.get("password").unwrap(), "s3cret");
        assert!(headers.get("password").unwrap().is_sensitive());
    }

    #[test]
    fn invalid_credential_value_is_config_error() {
        let mut cfg = DecoderConfig::for_profile(DecoderProfile::JdPower).unwrap();
        cfg.credentials = Some(Credentials::new("dealer\n", "x"));
        assert!(matches!(
            auth_headers(&cfg),
            Err(ConfigError::InvalidHeaderValue(_))
        ));
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(ERROR_BODY_LIMIT + 10);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), ERROR_BODY_LIMIT + 1);
        assert!(cut.ends_with('…'));
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn unreadable_error_body_is_reported() {
        let read_err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        let body = error_body(Err(read_err), "GET /x");
        assert!(body.starts_with("<unreadable body: "), "got {body}");
        assert_eq!(error_body(Ok("maintenance".into()), "GET /x"), "maintenance");
    }

    #[tokio::test]
    async fn empty_vin_fails_before_network() {
        // Closed port: a network attempt would surface as Http, not InvalidInput.
        let cfg = DecoderConfig::local_mock("http://127.0.0.1:1", DecoderProfile::Nhtsa).unwrap();
        let client = DecoderClient::new(cfg).unwrap();
        let err = client.decode_str("").await.unwrap_err();
        assert!(matches!(err, DecodeError::InvalidInput(_)));
    }
}
