//! # Vin Newtype
//!
//! A VIN is an opaque, case-sensitive lookup key. Checksum correctness and
//! the 17-character layout are left to the external decoder. This type
//! only guarantees the token is usable as a store key and as a single URL
//! path segment.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Vehicle Identification Number.
///
/// # Validation
///
/// - Must not be empty or whitespace-only
/// - Must not carry leading or trailing whitespace (tokens are never altered)
/// - Must not contain `/` or control characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    /// Create a VIN from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyVin`] for empty input and
    /// [`ValidationError::InvalidVin`] for input that cannot be a single key.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyVin);
        }
        if s.trim() != s {
            return Err(ValidationError::InvalidVin {
                vin: s.to_string(),
                reason: "surrounding whitespace",
            });
        }
        if s.contains('/') {
            return Err(ValidationError::InvalidVin {
                vin: s.to_string(),
                reason: "contains '/'",
            });
        }
        if s.chars().any(char::is_control) {
            return Err(ValidationError::InvalidVin {
                vin: s.to_string(),
                reason: "contains control characters",
            });
        }
        Ok(())
    }

    /// Access the VIN string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Vin {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Vin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Vin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_vin() {
        let vin = Vin::new("1HGCM82633A004352").unwrap();
        assert_eq!(vin.as_str(), "1HGCM82633A004352");
        assert_eq!(vin.to_string(), "1HGCM82633A004352");
    }

    #[test]
    fn accepts_non_standard_tokens() {
        // Length and checksum belong to the decoder.
        assert!(Vin::new("ABC").is_ok());
        assert!(Vin::new("BADVIN0000000001").is_ok());
    }

    #[test]
    fn is_case_sensitive() {
        let upper = Vin::new("1HGCM82633A004352").unwrap();
        let lower = Vin::new("1hgcm82633a004352").unwrap();
        assert_ne!(upper, lower);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Vin::new(""), Err(ValidationError::EmptyVin));
        assert_eq!(Vin::new("   "), Err(ValidationError::EmptyVin));
    }

    #[test]
    fn rejects_path_separator() {
        let err = Vin::new("1HGCM/82633").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVin { .. }));
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        assert!(matches!(
            Vin::new(" 1HGCM82633A004352"),
            Err(ValidationError::InvalidVin { .. })
        ));
    }

    #[test]
    fn rejects_control_characters() {
        assert!(Vin::new("1HGCM\n82633").is_err());
    }

    #[test]
    fn serde_is_transparent_and_validating() {
        let vin = Vin::new("1HGCM82633A004352").unwrap();
        let json = serde_json::to_string(&vin).unwrap();
        assert_eq!(json, "\"1HGCM82633A004352\"");
        let back: Vin = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vin);
        assert!(serde_json::from_str::<Vin>("\"\"").is_err());
    }
}
