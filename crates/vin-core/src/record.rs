//! # Canonical Vehicle Record
//!
//! The fixed-schema representation every decoder response is normalized into,
//! and the shape persisted by the store and returned by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::vin::Vin;

/// Opaque decoder payload: a JSON object's key/value pairs, in the order the
/// decoder returned them.
pub type RawPayload = serde_json::Map<String, serde_json::Value>;

/// One successful decoder answer.
///
/// `response` is the complete body and becomes the record's `raw`. `entry` is
/// the result entry canonical fields are read from; it is empty when the
/// decoder returned no results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPayload {
    /// The whole response object, kept verbatim.
    pub response: RawPayload,
    /// The selected result entry.
    pub entry: RawPayload,
}

impl DecodedPayload {
    /// A response that is itself the result entry.
    pub fn flat(raw: RawPayload) -> Self {
        Self {
            entry: raw.clone(),
            response: raw,
        }
    }
}

/// Canonical vehicle record keyed by VIN.
///
/// Canonical fields are `None` when the decoder did not supply them. Each
/// successful decode replaces every canonical field, `raw`, and `updated_at`
/// (last-write-wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VehicleRecord {
    /// Lookup key. Immutable once the record exists.
    #[schema(value_type = String, example = "1HGCM82633A004352")]
    pub vin: Vin,
    /// Manufacturer brand, e.g. `Honda`.
    pub make: Option<String>,
    /// Model name, e.g. `Civic`.
    pub model: Option<String>,
    /// Model year as reported by the decoder, e.g. `2020`.
    pub model_year: Option<String>,
    /// Legal manufacturer name.
    pub manufacturer: Option<String>,
    /// Country of the assembly plant.
    pub plant_country: Option<String>,
    /// State or province of the assembly plant.
    pub plant_state: Option<String>,
    /// Body style, e.g. `Sedan/Saloon`.
    pub body_class: Option<String>,
    /// Engine cylinder count.
    pub engine_cylinders: Option<String>,
    /// Primary fuel type.
    pub fuel_type: Option<String>,
    /// The decoder's full response, including fields not promoted above.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub raw: RawPayload,
    /// When this record was produced by a decode.
    pub updated_at: DateTime<Utc>,
}

impl VehicleRecord {
    /// An empty record: every canonical field absent and an empty payload.
    ///
    /// This is what a decoder that had no data for `vin` normalizes into.
    pub fn empty(vin: Vin, updated_at: DateTime<Utc>) -> Self {
        Self {
            vin,
            make: None,
            model: None,
            model_year: None,
            manufacturer: None,
            plant_country: None,
            plant_state: None,
            body_class: None,
            engine_cylinders: None,
            fuel_type: None,
            raw: RawPayload::new(),
            updated_at,
        }
    }

    /// Whether no canonical field is populated.
    pub fn has_no_canonical_fields(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.model_year.is_none()
            && self.manufacturer.is_none()
            && self.plant_country.is_none()
            && self.plant_state.is_none()
            && self.body_class.is_none()
            && self.engine_cylinders.is_none()
            && self.fuel_type.is_none()
    }
}
