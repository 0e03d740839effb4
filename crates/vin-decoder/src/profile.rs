//! Decoder profiles: URL layout and response shape per external service.

use serde_json::Value;
use url::Url;
use vin_core::{DecodedPayload, RawPayload, Vin};

use crate::config::ConfigError;
use crate::error::DecodeError;

/// Business status the JD Power service reports for a successful decode.
pub const JD_POWER_EXACT_MATCH: &str = "ExactMatch";

/// Which external decoder the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderProfile {
    /// NHTSA vPIC `DecodeVinValues`: `{"Results": [{...}]}`.
    Nhtsa,
    /// JD Power `GetModelsByVINV2`:
    /// `{"GetModelsByVINV2Result": {"Status": "...", "Models": [...], "VintageModels": [...]}}`.
    JdPower,
}

impl DecoderProfile {
    /// Production base URL used when none is configured.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Nhtsa => "https://vpic.nhtsa.dot.gov/api",
            Self::JdPower => "https://www.jdpowerwebservices.com",
        }
    }

    /// Stable lowercase name, as accepted by `DECODER_PROFILE`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nhtsa => "nhtsa",
            Self::JdPower => "jdpower",
        }
    }

    /// Build the request URL for `vin`. The VIN is pushed as a single
    /// percent-encoded path segment.
    pub fn request_url(self, base: &Url, vin: &Vin) -> Result<Url, ConfigError> {
        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ConfigError::InvalidUrl("base_url".into(), base.to_string()))?;
            segments.pop_if_empty();
            match self {
                Self::Nhtsa => segments.extend(["vehicles", "DecodeVinValues", vin.as_str()]),
                Self::JdPower => {
                    segments.extend(["UsedPowersportsService.svc", "VINV2", vin.as_str()])
                }
            };
        }
        if self == Self::Nhtsa {
            url.set_query(Some("format=json"));
        }
        Ok(url)
    }

    /// Split a decoded response body into the full response and the first
    /// result entry.
    ///
    /// The response is returned whole, including every result entry and any
    /// envelope fields (`Count`, `Message`, `Status`). An empty result list
    /// yields an empty entry. A non-affirmative JD Power status is
    /// [`DecodeError::NoMatch`] even though transport succeeded.
    pub fn extract(self, body: Value, endpoint: &str) -> Result<DecodedPayload, DecodeError> {
        let malformed = |reason: &str| DecodeError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let Value::Object(response) = body else {
            return Err(malformed("response is not a JSON object"));
        };

        let entry = match self {
            Self::Nhtsa => match response.get("Results") {
                Some(Value::Array(results)) => first_entry(results, endpoint)?,
                Some(_) => return Err(malformed("`Results` is not an array")),
                None => return Err(malformed("missing `Results`")),
            },
            Self::JdPower => {
                let Some(Value::Object(result)) = response.get("GetModelsByVINV2Result") else {
                    return Err(malformed("missing `GetModelsByVINV2Result` object"));
                };

                let status = match result.get("Status") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                if status != JD_POWER_EXACT_MATCH {
                    return Err(DecodeError::NoMatch { status });
                }

                let models = array_at(result, "Models", endpoint)?;
                if models.is_empty() {
                    first_entry(array_at(result, "VintageModels", endpoint)?, endpoint)?
                } else {
                    first_entry(models, endpoint)?
                }
            }
        };

        Ok(DecodedPayload { response, entry })
    }
}

impl std::fmt::Display for DecoderProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DecoderProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nhtsa" | "vpic" => Ok(Self::Nhtsa),
            "jdpower" | "jd_power" | "jdp" => Ok(Self::JdPower),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

/// Absent or null arrays count as empty.
fn array_at<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
    endpoint: &str,
) -> Result<&'a [Value], DecodeError> {
    match obj.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Ok(&[]),
        Some(_) => Err(DecodeError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: format!("`{key}` is not an array"),
        }),
    }
}

fn first_entry(entries: &[Value], endpoint: &str) -> Result<RawPayload, DecodeError> {
    match entries.first() {
        None => Ok(RawPayload::new()),
        Some(Value::Object(entry)) => Ok(entry.clone()),
        Some(_) => Err(DecodeError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: "result entry is not an object".to_string(),
        }),
    }
}
