//! # Read-Through Resolver
//!
//! Given a VIN: try the store; on a miss, decode, normalize, write back,
//! and return the canonical record regardless of which path produced it.
//!
//! ## Algorithm
//!
//! 1. Validate the VIN (`InvalidInput` before any store or network call).
//! 2. `store.get`: a hit short-circuits everything else. A read *error* is
//!    treated as a miss and recorded as a warning.
//! 3. `decoder.decode`: failure is `DecodeFailed`; nothing is written.
//! 4. Normalize, keyed by the request VIN.
//! 5. `store.upsert`: failure is non-fatal and recorded as a warning.
//! 6. Return the normalized record.
//!
//! ## Coalescing
//!
//! With [`ResolverOptions::coalesce_decodes`], concurrent misses for the same
//! VIN queue on a per-VIN async lock. Each holder re-reads the store before
//! decoding, so one decode serves the whole burst. The decoder
//! client itself never retries.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use vin_core::{normalize_decoded, ValidationError, VehicleRecord, Vin};
use vin_decoder::{DecodeError, VinDecoder};

use crate::store::{StoreError, VehicleStore};

/// Which path produced a resolved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    /// Cache hit.
    Store,
    /// Fresh decode.
    Decoder,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Decoder => "decoder",
        }
    }
}

/// A non-fatal problem observed while resolving.
#[derive(Debug)]
pub enum ResolveWarning {
    /// The store read failed; the resolver fell through to the decoder.
    StoreReadFailed(StoreError),
    /// The decoded record could not be cached. It was still returned.
    StoreWriteFailed(StoreError),
}

/// Outcome of a successful resolution: the record plus any side observations.
#[derive(Debug)]
pub struct Resolved {
    pub record: VehicleRecord,
    pub source: ResolutionSource,
    pub warnings: Vec<ResolveWarning>,
}

impl Resolved {
    /// Whether the decoded record failed to reach the store.
    pub fn cache_write_failed(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ResolveWarning::StoreWriteFailed(_)))
    }
}

/// Errors from resolution and store-only lookup.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Caller supplied an unusable VIN.
    #[error("invalid VIN: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The decoder failed for this VIN. The store was not touched.
    #[error("decode failed for {vin}: {source}")]
    DecodeFailed {
        vin: Vin,
        #[source]
        source: DecodeError,
    },

    /// Store-only lookup could not read the store.
    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Resolver tuning.
#[derive(Debug, Clone, Copy)]
pub struct ResolverOptions {
    /// Coalesce concurrent decodes for the same VIN.
    pub coalesce_decodes: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            coalesce_decodes: true,
        }
    }
}

/// Read-through resolver. Cheap to clone; clones share the store, decoder,
/// and in-flight table.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn VehicleStore>,
    decoder: Arc<dyn VinDecoder>,
    options: ResolverOptions,
    inflight: InflightTable,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &self.store.backend())
            .field("decoder", &self.decoder.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Resolver {
    pub fn new(store: Arc<dyn VehicleStore>, decoder: Arc<dyn VinDecoder>) -> Self {
        Self::with_options(store, decoder, ResolverOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn VehicleStore>,
        decoder: Arc<dyn VinDecoder>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            store,
            decoder,
            options,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn VehicleStore> {
        &self.store
    }

    /// Resolve `vin` through the store, falling back to the decoder.
    pub async fn resolve(&self, vin: &str) -> Result<Resolved, ResolutionError> {
        let vin = Vin::new(vin)?;
        let mut warnings = Vec::new();

        if let Some(record) = self.read_store(&vin, &mut warnings).await {
            return Ok(Resolved {
                record,
                source: ResolutionSource::Store,
                warnings,
            });
        }

        if !self.options.coalesce_decodes {
            return self.decode_and_store(vin, warnings).await;
        }

        let store_readable = warnings.is_empty();
        let slot = self.acquire_slot(&vin).await;
        // A previous holder may have populated the store since the first read.
        if store_readable {
            if let Some(record) = self.read_store(&vin, &mut warnings).await {
                return Ok(Resolved {
                    record,
                    source: ResolutionSource::Store,
                    warnings,
                });
            }
        }
        let result = self.decode_and_store(vin, warnings).await;
        drop(slot);
        result
    }

    /// Store-only lookup. Never calls the decoder.
    pub async fn lookup(&self, vin: &str) -> Result<Option<VehicleRecord>, ResolutionError> {
        let vin = Vin::new(vin)?;
        Ok(self.store.get(&vin).await?)
    }

    async fn read_store(
        &self,
        vin: &Vin,
        warnings: &mut Vec<ResolveWarning>,
    ) -> Option<VehicleRecord> {
        match self.store.get(vin).await {
            Ok(Some(record)) => {
                tracing::debug!(vin = %vin, store = self.store.backend(), "cache hit");
                Some(record)
            }
            Ok(None) => {
                tracing::debug!(vin = %vin, store = self.store.backend(), "cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(
                    vin = %vin,
                    store = self.store.backend(),
                    error = %e,
                    "store read failed, treating as cache miss"
                );
                warnings.push(ResolveWarning::StoreReadFailed(e));
                None
            }
        }
    }

    async fn decode_and_store(
        &self,
        vin: Vin,
        mut warnings: Vec<ResolveWarning>,
    ) -> Result<Resolved, ResolutionError> {
        let decoded = match self.decoder.decode(&vin).await {
            Ok(decoded) => decoded,
            Err(source) => {
                tracing::warn!(
                    vin = %vin,
                    decoder = self.decoder.name(),
                    error = %source,
                    "decode failed"
                );
                return Err(ResolutionError::DecodeFailed { vin, source });
            }
        };

        let record = normalize_decoded(vin, decoded);
        if record.has_no_canonical_fields() {
            tracing::info!(vin = %record.vin, "decoder returned no data, caching empty record");
        }

        if let Err(e) = self.store.upsert(&record).await {
            tracing::warn!(
                vin = %record.vin,
                store = self.store.backend(),
                error = %e,
                "failed to cache decoded record"
            );
            warnings.push(ResolveWarning::StoreWriteFailed(e));
        }

        Ok(Resolved {
            record,
            source: ResolutionSource::Decoder,
            warnings,
        })
    }

    async fn acquire_slot(&self, vin: &Vin) -> InflightSlot {
        let lock = {
            let mut table = self.inflight.lock();
            let entry = table.entry(vin.clone()).or_default();
            entry.holders += 1;
            Arc::clone(&entry.lock)
        };

        // Registered before awaiting so a cancelled waiter still deregisters.
        let mut slot = InflightSlot {
            table: Arc::clone(&self.inflight),
            vin: vin.clone(),
            guard: None,
        };
        slot.guard = Some(lock.lock_owned().await);
        slot
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.lock().len()
    }
}

type InflightTable = Arc<Mutex<HashMap<Vin, InflightEntry>>>;

#[derive(Default)]
struct InflightEntry {
    lock: Arc<AsyncMutex<()>>,
    holders: usize,
}

/// One caller's registration in the in-flight table. Dropping it (including
/// on cancellation) releases the lock and removes the entry once the last
/// registered caller is gone.
struct InflightSlot {
    table: InflightTable,
    vin: Vin,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for InflightSlot {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut table = self.table.lock();
        if let Some(entry) = table.get_mut(&self.vin) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                table.remove(&self.vin);
            }
        }
    }
}
