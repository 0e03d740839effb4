//! # vin-decoder -- Typed client for external VIN decoding services
//!
//! The external decoder is authoritative for VIN decoding. This crate only
//! issues the request, checks transport and business status, and hands back
//! the whole response plus its first result entry as a [`DecodedPayload`].
//! Normalization into a canonical record happens in `vin-core`.
//!
//! ## Profiles
//!
//! | Profile   | Path                                         | Shape                          |
//! |-----------|----------------------------------------------|--------------------------------|
//! | `nhtsa`   | `/vehicles/DecodeVinValues/{vin}?format=json` | flat `Results` array           |
//! | `jdpower` | `/UsedPowersportsService.svc/VINV2/{vin}`     | nested result + `Status` field |
//!
//! ## Retry
//!
//! There is none. A single failed attempt is surfaced immediately; retry
//! policy belongs to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod profile;

pub use client::DecoderClient;
pub use config::{ConfigError, Credentials, DecoderConfig};
pub use error::DecodeError;
pub use profile::DecoderProfile;

use async_trait::async_trait;
use vin_core::{DecodedPayload, Vin};

/// Anything that can turn a VIN into a decoder payload.
///
/// [`DecoderClient`] is the production implementation. The resolver depends
/// on this trait so tests can substitute an in-process fake.
#[async_trait]
pub trait VinDecoder: Send + Sync {
    /// Short identifier for logs (e.g. `"nhtsa"`).
    fn name(&self) -> &str;

    /// Decode `vin` into the full response and its first result entry.
    ///
    /// An empty result set is `Ok` with an empty entry. Every failure mode
    /// is a [`DecodeError`]; there is no partial result.
    async fn decode(&self, vin: &Vin) -> Result<DecodedPayload, DecodeError>;
}
