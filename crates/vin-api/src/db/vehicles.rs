//! Vehicle persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `vehicles` table.
//! [`PgVehicleStore`] wraps them behind the [`VehicleStore`] trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vin_core::{RawPayload, VehicleRecord, Vin};

use crate::store::{StoreError, VehicleStore};

/// Upsert a vehicle record.
///
/// `ON CONFLICT` makes the insert-or-replace a single statement. The
/// `WHERE` clause keeps the newest `updated_at` when writers race. `raw` is
/// bound as text and cast to `json` so the decoder's key order is stored
/// as written.
pub async fn upsert(pool: &PgPool, record: &VehicleRecord) -> Result<(), sqlx::Error> {
    let raw = serde_json::Value::Object(record.raw.clone()).to_string();

    sqlx::query(
        "INSERT INTO vehicles (vin, make, model, model_year, manufacturer, plant_country, plant_state, body_class, engine_cylinders, fuel_type, raw, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11::json, $12)
         ON CONFLICT (vin) DO UPDATE SET
            make = EXCLUDED.make,
            model = EXCLUDED.model,
            model_year = EXCLUDED.model_year,
            manufacturer = EXCLUDED.manufacturer,
            plant_country = EXCLUDED.plant_country,
            plant_state = EXCLUDED.plant_state,
            body_class = EXCLUDED.body_class,
            engine_cylinders = EXCLUDED.engine_cylinders,
            fuel_type = EXCLUDED.fuel_type,
            raw = EXCLUDED.raw,
            updated_at = EXCLUDED.updated_at
         WHERE vehicles.updated_at <= EXCLUDED.updated_at"
    )
    .bind(record.vin.as_str())
    .bind(&record.make)
    .bind(&record.model)
    .bind(&record.model_year)
    .bind(&record.manufacturer)
    .bind(&record.plant_country)
    .bind(&record.plant_state)
    .bind(&record.body_class)
    .bind(&record.engine_cylinders)
    .bind(&record.fuel_type)
    .bind(&raw)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a vehicle by VIN.
pub async fn get_by_vin(pool: &PgPool, vin: &Vin) -> Result<Option<VehicleRecord>, StoreError> {
    let row = sqlx::query_as::<_, VehicleRow>(
        "SELECT vin, make, model, model_year, manufacturer, plant_country, plant_state, body_class, engine_cylinders, fuel_type, raw::text AS raw, updated_at
         FROM vehicles WHERE vin = $1",
    )
    .bind(vin.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(VehicleRow::into_record).transpose()
}

/// Count cached vehicles.
pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
        .fetch_one(pool)
        .await
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct VehicleRow {
    vin: String,
    make: Option<String>,
    model: Option<String>,
    model_year: Option<String>,
    manufacturer: Option<String>,
    plant_country: Option<String>,
    plant_state: Option<String>,
    body_class: Option<String>,
    engine_cylinders: Option<String>,
    fuel_type: Option<String>,
    raw: String,
    updated_at: DateTime<Utc>,
}

impl VehicleRow {
    fn into_record(self) -> Result<VehicleRecord, StoreError> {
        let vin = Vin::new(self.vin.clone()).map_err(|e| StoreError::Corrupt {
            vin: self.vin.clone(),
            reason: e.to_string(),
        })?;
        let raw: RawPayload =
            serde_json::from_str(&self.raw).map_err(|e| StoreError::Corrupt {
                vin: self.vin.clone(),
                reason: format!("raw payload is not a JSON object: {e}"),
            })?;

        Ok(VehicleRecord {
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
            updated_at: self.updated_at,
        })
    }
}

/// [`VehicleStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, vin: &Vin) -> Result<Option<VehicleRecord>, StoreError> {
        get_by_vin(&self.pool, vin).await
    }

    async fn upsert(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        Ok(upsert(&self.pool, record).await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(count(&self.pool).await?.max(0) as u64)
    }
}
