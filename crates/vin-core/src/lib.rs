#![deny(missing_docs)]

//! # vin-core — Domain Primitives for the VIN Resolver
//!
//! Foundational types shared by the decoder client and the API service.
//! No internal crate dependencies. External: `serde`, `serde_json`, `thiserror`,
//! `chrono`, and `utoipa`.
//!
//! ## Design Principles
//!
//! 1. **[`Vin`] is validated once, at the boundary.** Everything downstream of
//!    construction can assume a non-empty, single-segment token.
//!
//! 2. **[`VehicleRecord`] is the only canonical shape.** Decoder responses of
//!    any profile flow through [`normalize`] before they are stored or
//!    returned.
//!
//! 3. **[`RawPayload`] is opaque.** Fields the canonical schema does not
//!    promote are kept verbatim so nothing the decoder said is lost.

pub mod error;
pub mod normalize;
pub mod record;
pub mod vin;

pub use error::ValidationError;
pub use normalize::{normalize, normalize_at, normalize_decoded, normalize_decoded_at, FIELD_SOURCES};
pub use record::{DecodedPayload, RawPayload, VehicleRecord};
pub use vin::Vin;
