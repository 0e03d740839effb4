//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VIN Resolver API",
        version = "0.1.0",
        description = "Read-through VIN resolution: cached canonical vehicle records backed by an external decoder.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::vehicles::resolve_vin,
        crate::routes::vehicles::resolve_nhtsa,
        crate::routes::vehicles::get_vehicle,
        crate::routes::health::healthz,
        crate::routes::health::readyz,
    ),
    components(schemas(
        vin_core::VehicleRecord,
        crate::routes::health::HealthResponse,
        crate::routes::health::ReadinessResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "vehicles", description = "VIN resolution and cached lookup"),
        (name = "health", description = "Liveness and readiness"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
