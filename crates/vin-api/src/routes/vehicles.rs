//! # Vehicle Routes
//!
//! ## Endpoints
//!
//! - `GET /vin/:vin` — resolve through the store, decoding on a miss
//! - `GET /nhtsa/:vin` — same resolution; kept for clients of the vPIC proxy
//! - `GET /vehicles/:vin` — store-only lookup, 404 on miss
//!
//! The bare prefixes (`/vin`, `/vin/`, `/nhtsa`, `/nhtsa/`, `/vehicles/`)
//! answer 400 because the VIN segment is missing.
//!
//! Resolution responses carry an `x-vin-source` header (`store` or
//! `decoder`) naming the path that produced the record.

use axum::extract::{Path, State};
use axum::http::header::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use vin_core::VehicleRecord;

use crate::error::AppError;
use crate::state::AppState;

/// Response header naming the resolution path.
pub const VIN_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-vin-source");

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vin/:vin", get(resolve_vin))
        .route("/nhtsa/:vin", get(resolve_nhtsa))
        .route("/vehicles/:vin", get(get_vehicle))
        .route("/vin", get(missing_vin))
        .route("/vin/", get(missing_vin))
        .route("/nhtsa", get(missing_vin))
        .route("/nhtsa/", get(missing_vin))
        .route("/vehicles/", get(missing_vin))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /vin/:vin — Resolve a VIN to its canonical record.
#[utoipa::path(
    get,
    path = "/vin/{vin}",
    params(("vin" = String, Path, description = "Vehicle Identification Number")),
    responses(
        (status = 200, description = "Resolved record", body = VehicleRecord,
            headers(("x-vin-source" = String, description = "store | decoder"))),
        (status = 400, description = "Missing or invalid VIN", body = crate::error::ErrorBody),
        (status = 502, description = "Decoder failed", body = crate::error::ErrorBody),
        (status = 504, description = "Decoder timed out", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub(crate) async fn resolve_vin(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Response, AppError> {
    resolve(&state, &vin).await
}

/// GET /nhtsa/:vin — Resolve a VIN (vPIC-compatible path).
#[utoipa::path(
    get,
    path = "/nhtsa/{vin}",
    params(("vin" = String, Path, description = "Vehicle Identification Number")),
    responses(
        (status = 200, description = "Resolved record", body = VehicleRecord,
            headers(("x-vin-source" = String, description = "store | decoder"))),
        (status = 400, description = "Missing or invalid VIN", body = crate::error::ErrorBody),
        (status = 502, description = "Decoder failed", body = crate::error::ErrorBody),
        (status = 504, description = "Decoder timed out", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub(crate) async fn resolve_nhtsa(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Response, AppError> {
    resolve(&state, &vin).await
}

async fn resolve(state: &AppState, vin: &str) -> Result<Response, AppError> {
    let resolved = state.resolver.resolve(vin).await?;
    Ok((
        [(VIN_SOURCE_HEADER, resolved.source.as_str())],
        Json(resolved.record),
    )
        .into_response())
}

/// GET /vehicles/:vin — Read a cached record without decoding.
#[utoipa::path(
    get,
    path = "/vehicles/{vin}",
    params(("vin" = String, Path, description = "Vehicle Identification Number")),
    responses(
        (status = 200, description = "Cached record", body = VehicleRecord),
        (status = 400, description = "Missing or invalid VIN", body = crate::error::ErrorBody),
        (status = 404, description = "VIN not cached", body = crate::error::ErrorBody),
    ),
    tag = "vehicles"
)]
pub(crate) async fn get_vehicle(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<VehicleRecord>, AppError> {
    state
        .resolver
        .lookup(&vin)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("vehicle {vin} not cached")))
}

async fn missing_vin() -> AppError {
    AppError::BadRequest("missing VIN path segment".to_string())
}
