//! Liveness and readiness endpoints.
//!
//! `/healthz` never touches the store or the decoder. `/readyz` asks the
//! store for its record count and answers 503 when it cannot.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Server time, RFC 3339.
    pub time: String,
}

impl HealthResponse {
    fn at(now: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Readiness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    /// Always `"ready"`.
    pub status: String,
    /// Store backend, `postgres` or `memory`.
    pub store: String,
    /// Number of cached vehicle records.
    pub cached_vehicles: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}

/// GET /healthz — Liveness check.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse),
    ),
    tag = "health"
)]
pub(crate) async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse::at(Utc::now()))
}

/// GET /readyz — Readiness check backed by the store.
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Store is reachable", body = ReadinessResponse),
        (status = 503, description = "Store is not reachable", body = crate::error::ErrorBody),
    ),
    tag = "health"
)]
pub(crate) async fn readyz(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, AppError> {
    let store = state.store();
    let cached_vehicles = store.count().await.map_err(|e| {
        tracing::warn!(store = store.backend(), error = %e, "readiness check failed");
        AppError::ServiceUnavailable(format!("{} store is not reachable", store.backend()))
    })?;

    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        store: store.backend().to_string(),
        cached_vehicles,
    }))
}
