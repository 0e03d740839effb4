//! # Record Normalizer
//!
//! Maps a loosely-typed decoder payload onto [`VehicleRecord`]. Normalization
//! is total: it never fails, and the full response is always retained in
//! `raw`. For wrapped responses ([`DecodedPayload`]) the canonical fields are
//! read from the selected result entry only.
//!
//! ## Source Keys
//!
//! Each canonical field reads from a fixed, ordered list of source keys
//! ([`FIELD_SOURCES`]). The first key that is present with a usable scalar
//! value wins. Primary keys follow NHTSA vPIC `DecodeVinValues` naming; the
//! aliases cover the JD Power powersports `Models` entries.
//!
//! ## Value Coercion
//!
//! | JSON value            | Canonical value        |
//! |-----------------------|------------------------|
//! | non-blank string      | the string             |
//! | number                | decimal rendering      |
//! | bool                  | `"true"` / `"false"`   |
//! | blank string, null    | absent                 |
//! | array, object         | absent (kept in `raw`) |

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::record::{DecodedPayload, RawPayload, VehicleRecord};
use crate::vin::Vin;

/// Canonical field name paired with the decoder keys it is read from.
pub const FIELD_SOURCES: &[(&str, &[&str])] = &[
    ("make", &["Make"]),
    ("model", &["Model"]),
    ("model_year", &["ModelYear", "Year"]),
    ("manufacturer", &["Manufacturer"]),
    ("plant_country", &["PlantCountry"]),
    ("plant_state", &["PlantState"]),
    ("body_class", &["BodyClass", "ModelType"]),
    ("engine_cylinders", &["EngineCylinders", "Cylinders"]),
    ("fuel_type", &["FuelTypePrimary", "FuelType"]),
];

/// Normalize a flat decoder payload into a record stamped with the current time.
///
/// The record is keyed by the request `vin`, regardless
/// of any VIN field inside `raw`.
pub fn normalize(vin: Vin, raw: RawPayload) -> VehicleRecord {
    normalize_at(vin, raw, Utc::now())
}

/// Normalize a flat decoder payload with an explicit `updated_at`.
pub fn normalize_at(vin: Vin, raw: RawPayload, updated_at: DateTime<Utc>) -> VehicleRecord {
    Canonical::read(&raw).into_record(vin, raw, updated_at)
}

/// Normalize a full decoder answer: canonical fields come from the selected
/// entry, and the whole response is kept as `raw`.
pub fn normalize_decoded(vin: Vin, decoded: DecodedPayload) -> VehicleRecord {
    normalize_decoded_at(vin, decoded, Utc::now())
}

/// [`normalize_decoded`] with an explicit `updated_at`.
pub fn normalize_decoded_at(
    vin: Vin,
    decoded: DecodedPayload,
    updated_at: DateTime<Utc>,
) -> VehicleRecord {
    Canonical::read(&decoded.entry).into_record(vin, decoded.response, updated_at)
}

struct Canonical {
    make: Option<String>,
    model: Option<String>,
    model_year: Option<String>,
    manufacturer: Option<String>,
    plant_country: Option<String>,
    plant_state: Option<String>,
    body_class: Option<String>,
    engine_cylinders: Option<String>,
    fuel_type: Option<String>,
}

impl Canonical {
    fn read(source: &RawPayload) -> Self {
        let field = |name: &str| -> Option<String> {
            FIELD_SOURCES
                .iter()
                .find(|(canonical, _)| *canonical == name)
                .and_then(|(_, keys)| keys.iter().find_map(|key| source.get(*key).and_then(scalar)))
        };

        Self {
            make: field("make"),
            model: field("model"),
            model_year: field("model_year"),
            manufacturer: field("manufacturer"),
            plant_country: field("plant_country"),
            plant_state: field("plant_state"),
            body_class: field("body_class"),
            engine_cylinders: field("engine_cylinders"),
            fuel_type: field("fuel_type"),
        }
    }

    fn into_record(self, vin: Vin, raw: RawPayload, updated_at: DateTime<Utc>) -> VehicleRecord {
        VehicleRecord {
            vin,
            make: self.make,
            model: self.model,
            model_year: self.model_year,
            manufacturer: self.manufacturer,
            plant_country: self.plant_country,
            plant_state: self.plant_state,
            body_class: self.body_class,
            engine_cylinders: self.engine_cylinders,
            fuel_type: self.fuel_type,
            raw,
            updated_at,
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RawPayload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn vin() -> Vin {
        Vin::new("1HGCM82633A004352").unwrap()
    }

    #[test]
    fn maps_honda_civic() {
        let raw = payload(json!({"Make": "Honda", "Model": "Civic", "ModelYear": 2020}));
        let record = normalize(vin(), raw.clone());

        assert_eq!(record.vin, vin());
        assert_eq!(record.make.as_deref(), Some("Honda"));
        assert_eq!(record.model.as_deref(), Some("Civic"));
        assert_eq!(record.model_year.as_deref(), Some("2020"));
        assert!(record.manufacturer.is_none());
        assert!(record.plant_country.is_none());
        assert!(record.plant_state.is_none());
        assert!(record.body_class.is_none());
        assert!(record.engine_cylinders.is_none());
        assert!(record.fuel_type.is_none());
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn maps_full_vpic_entry() {
        let raw = payload(json!({
            "Make": "HONDA",
            "Model": "Accord",
            "ModelYear": "2003",
            "Manufacturer": "AMERICAN HONDA MOTOR CO., INC.",
            "PlantCountry": "UNITED STATES (USA)",
            "PlantState": "OHIO",
            "BodyClass": "Coupe",
            "EngineCylinders": "4",
            "FuelTypePrimary": "Gasoline",
            "VIN": "1HGCM82633A004352",
            "ErrorCode": "0"
        }));
        let record = normalize(vin(), raw);
        assert_eq!(record.manufacturer.as_deref(), Some("AMERICAN HONDA MOTOR CO., INC."));
        assert_eq!(record.plant_country.as_deref(), Some("UNITED STATES (USA)"));
        assert_eq!(record.plant_state.as_deref(), Some("OHIO"));
        assert_eq!(record.body_class.as_deref(), Some("Coupe"));
        assert_eq!(record.engine_cylinders.as_deref(), Some("4"));
        assert_eq!(record.fuel_type.as_deref(), Some("Gasoline"));
        assert_eq!(record.raw.get("ErrorCode"), Some(&json!("0")));
    }

    #[test]
    fn maps_jd_power_aliases() {
        let raw = payload(json!({
            "Make": "HARLEY-DAVIDSON",
            "Year": 2019,
            "Model": "FLHXS Street Glide Special",
            "ModelType": "Touring",
            "Cylinders": 2,
            "MSRP": 27239
        }));
        let record = normalize(vin(), raw);
        assert_eq!(record.model_year.as_deref(), Some("2019"));
        assert_eq!(record.body_class.as_deref(), Some("Touring"));
        assert_eq!(record.engine_cylinders.as_deref(), Some("2"));
    }

    #[test]
    fn primary_key_wins_over_alias() {
        let raw = payload(json!({"ModelYear": "2021", "Year": 1999}));
        let record = normalize(vin(), raw);
        assert_eq!(record.model_year.as_deref(), Some("2021"));
    }

    #[test]
    fn null_or_blank_primary_falls_through_to_alias() {
        let raw = payload(json!({"ModelYear": null, "Year": 2018, "EngineCylinders": "", "Cylinders": 1}));
        let record = normalize(vin(), raw);
        assert_eq!(record.model_year.as_deref(), Some("2018"));
        assert_eq!(record.engine_cylinders.as_deref(), Some("1"));
    }

    #[test]
    fn null_and_blank_values_are_absent() {
        let raw = payload(json!({"Make": null, "Model": "   ", "PlantState": ""}));
        let record = normalize(vin(), raw.clone());
        assert!(record.has_no_canonical_fields());
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn nested_values_are_kept_raw_only() {
        let raw = payload(json!({"Make": {"name": "Honda"}, "Model": ["Civic"]}));
        let record = normalize(vin(), raw.clone());
        assert!(record.make.is_none());
        assert!(record.model.is_none());
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn empty_payload_is_valid_empty_record() {
        let record = normalize(vin(), RawPayload::new());
        assert!(record.has_no_canonical_fields());
        assert!(record.raw.is_empty());
    }

    #[test]
    fn request_vin_is_authoritative() {
        let raw = payload(json!({"VIN": "SOMETHINGELSE", "Make": "Honda"}));
        let record = normalize(vin(), raw);
        assert_eq!(record.vin, vin());
    }

    #[test]
    fn raw_preserves_decoder_key_order() {
        let raw = payload(json!({"Zeta": 1, "Alpha": 2, "Make": "Honda"}));
        let record = normalize(vin(), raw);
        let keys: Vec<&str> = record.raw.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Make"]);
    }

    #[test]
    fn decoded_reads_entry_and_keeps_whole_response() {
        let response = payload(json!({
            "GetModelsByVINV2Result": {
                "Status": "ExactMatch",
                "Models": [
                    {"Make": "YAMAHA", "Model": "MT-07", "Year": 2021},
                    {"Make": "YAMAHA", "Model": "MT-07 ABS", "Year": 2021}
                ]
            }
        }));
        let entry = payload(json!({"Make": "YAMAHA", "Model": "MT-07", "Year": 2021}));
        let record = normalize_decoded(
            vin(),
            DecodedPayload {
                response: response.clone(),
                entry,
            },
        );

        assert_eq!(record.model.as_deref(), Some("MT-07"));
        assert_eq!(record.model_year.as_deref(), Some("2021"));
        assert_eq!(record.raw, response);
        assert!(record.raw.get("Make").is_none());
    }

    #[test]
    fn decoded_without_entry_keeps_envelope() {
        let response = payload(json!({"Count": 0, "Message": "No results", "Results": []}));
        let record = normalize_decoded(
            vin(),
            DecodedPayload {
                response: response.clone(),
                entry: RawPayload::new(),
            },
        );
        assert!(record.has_no_canonical_fields());
        assert_eq!(record.raw, response);
    }

    #[test]
    fn flat_decoded_matches_normalize() {
        let raw = payload(json!({"Make": "Honda", "Model": "Civic"}));
        let at = Utc::now();
        assert_eq!(
            normalize_decoded_at(vin(), DecodedPayload::flat(raw.clone()), at),
            normalize_at(vin(), raw, at)
        );
    }

    #[test]
    fn normalize_at_uses_given_timestamp() {
        let at = "2026-01-15T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let record = normalize_at(vin(), RawPayload::new(), at);
        assert_eq!(record.updated_at, at);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| json!(n)),
                "[ -~]{0,12}".prop_map(Value::String),
            ]
        }

        fn arb_payload() -> impl Strategy<Value = RawPayload> {
            let key = prop_oneof![
                Just("Make".to_string()),
                Just("Model".to_string()),
                Just("ModelYear".to_string()),
                Just("Year".to_string()),
                Just("Cylinders".to_string()),
                "[A-Za-z]{1,10}",
            ];
            proptest::collection::vec((key, arb_value()), 0..12)
                .prop_map(|pairs| pairs.into_iter().collect())
        }

        proptest! {
            #[test]
            fn raw_is_retained_verbatim(raw in arb_payload()) {
                let record = normalize(vin(), raw.clone());
                prop_assert_eq!(record.raw, raw);
            }

            #[test]
            fn make_matches_source_scalar(raw in arb_payload()) {
                let expected = raw.get("Make").and_then(scalar);
                let record = normalize(vin(), raw);
                prop_assert_eq!(record.make, expected);
            }

            #[test]
            fn canonical_fields_are_never_blank(raw in arb_payload()) {
                let record = normalize(vin(), raw);
                for value in [&record.make, &record.model, &record.model_year, &record.engine_cylinders] {
                    if let Some(v) = value {
                        prop_assert!(!v.trim().is_empty());
                    }
                }
            }
        }
    }
}
