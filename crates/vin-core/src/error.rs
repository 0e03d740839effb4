//! # Validation Errors
//!
//! Structured errors for domain primitive construction, built with `thiserror`.

use thiserror::Error;

/// A domain primitive was rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The VIN was empty or contained only whitespace.
    #[error("VIN must not be empty")]
    EmptyVin,

    /// The VIN contained characters that cannot form a single lookup key.
    #[error("invalid VIN {vin:?}: {reason}")]
    InvalidVin {
        /// The rejected input, verbatim.
        vin: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
