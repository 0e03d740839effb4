//! # vin-api — Read-Through VIN Resolution Service
//!
//! Given a VIN, returns a canonical vehicle record. Records already in the
//! store are served directly; misses are decoded by the configured external
//! decoder, normalized, written back, and returned.
//!
//! ## API Surface
//!
//! | Route              | Module                  | Behavior                 |
//! |--------------------|-------------------------|--------------------------|
//! | `/vin/:vin`        | [`routes::vehicles`]    | Read-through resolve     |
//! | `/nhtsa/:vin`      | [`routes::vehicles`]    | Read-through resolve     |
//! | `/vehicles/:vin`   | [`routes::vehicles`]    | Store-only lookup        |
//! | `/healthz`         | [`routes::health`]      | Liveness                 |
//! | `/readyz`          | [`routes::health`]      | Store readiness + count  |
//! | `/openapi.json`    | [`openapi`]             | OpenAPI document         |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → TimeoutLayer → Handler
//! ```

pub mod db;
pub mod error;
pub mod openapi;
pub mod resolver;
pub mod routes;
pub mod state;
pub mod store;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .merge(routes::vehicles::router())
        .merge(routes::health::router())
        .merge(openapi::router())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
