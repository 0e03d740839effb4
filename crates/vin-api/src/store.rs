//! # Store Adapter
//!
//! Read/write interface to the persistent VIN table. Cache semantics are
//! binary: a present record is always valid and is returned without
//! re-validation against the decoder.
//!
//! ## Upsert Contract
//!
//! `upsert` is a single atomic insert-or-replace keyed by VIN. A write is
//! applied only when its `updated_at` is at least as new as the stored one,
//! so concurrent writers converge on the newest decode (last-write-wins) and
//! repeating an identical upsert is a no-op on observable state.
//!
//! ## Implementations
//!
//! - [`crate::db::vehicles::PgVehicleStore`] — Postgres via SQLx.
//! - [`InMemoryVehicleStore`] — used when `DATABASE_URL` is unset, and as
//!   the substitutable fake in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use vin_core::{VehicleRecord, Vin};

/// Persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database rejected or failed the operation.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be turned back into a record.
    #[error("stored record for {vin} is corrupt: {reason}")]
    Corrupt { vin: String, reason: String },
}

/// Keyed vehicle persistence.
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Backend name for logs (e.g. `"postgres"`).
    fn backend(&self) -> &'static str;

    /// Exact-key lookup. `Ok(None)` is a miss.
    async fn get(&self, vin: &Vin) -> Result<Option<VehicleRecord>, StoreError>;

    /// Create the row if absent, otherwise atomically replace every canonical
    /// field, the raw payload, and `updated_at` (last-write-wins).
    async fn upsert(&self, record: &VehicleRecord) -> Result<(), StoreError>;

    /// Number of cached records.
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Thread-safe, cloneable in-memory vehicle store.
///
/// The lock is `parking_lot` (non-poisoning) and is never held across an
/// `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVehicleStore {
    data: Arc<RwLock<HashMap<Vin, VehicleRecord>>>,
}

impl InMemoryVehicleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a record, bypassing the async trait.
    pub fn peek(&self, vin: &Vin) -> Option<VehicleRecord> {
        self.data.read().get(vin).cloned()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VehicleStore for InMemoryVehicleStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, vin: &Vin) -> Result<Option<VehicleRecord>, StoreError> {
        Ok(self.peek(vin))
    }

    async fn upsert(&self, record: &VehicleRecord) -> Result<(), StoreError> {
        let mut guard = self.data.write();
        match guard.get(&record.vin) {
            Some(existing) if existing.updated_at > record.updated_at => {
                tracing::debug!(
                    vin = %record.vin,
                    "skipping upsert older than stored record"
                );
            }
            _ => {
                guard.insert(record.vin.clone(), record.clone());
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vin_core::normalize::normalize_at;
    use vin_core::RawPayload;

    fn record(make: &str, at: chrono::DateTime<Utc>) -> VehicleRecord {
        let mut raw = RawPayload::new();
        raw.insert("Make".into(), serde_json::json!(make));
        normalize_at(Vin::new("1HGCM82633A004352").unwrap(), raw, at)
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = InMemoryVehicleStore::new();
        let vin = Vin::new("NOPE").unwrap();
        assert!(store.get(&vin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_creates_then_replaces() {
        let store = InMemoryVehicleStore::new();
        let now = Utc::now();
        store.upsert(&record("Honda", now)).await.unwrap();
        store
            .upsert(&record("Acura", now + Duration::seconds(1)))
            .await
            .unwrap();

        let stored = store.get(&record("x", now).vin).await.unwrap().unwrap();
        assert_eq!(stored.make.as_deref(), Some("Acura"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = InMemoryVehicleStore::new();
        let rec = record("Honda", Utc::now());
        store.upsert(&rec).await.unwrap();
        let once = store.peek(&rec.vin);
        store.upsert(&rec).await.unwrap();
        assert_eq!(store.peek(&rec.vin), once);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn older_write_does_not_clobber_newer() {
        let store = InMemoryVehicleStore::new();
        let now = Utc::now();
        store.upsert(&record("Newer", now)).await.unwrap();
        store
            .upsert(&record("Older", now - Duration::seconds(5)))
            .await
            .unwrap();
        let stored = store.peek(&record("x", now).vin).unwrap();
        assert_eq!(stored.make.as_deref(), Some("Newer"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryVehicleStore::new();
        let other = store.clone();
        store.upsert(&record("Honda", Utc::now())).await.unwrap();
        assert_eq!(other.len(), 1);
    }
}
