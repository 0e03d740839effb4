//! # API Route Modules
//!
//! - `vehicles` — read-through resolution (`/vin/:vin`, `/nhtsa/:vin`) and
//!   store-only lookup (`/vehicles/:vin`).
//! - `health` — liveness (`/healthz`) and store-backed readiness (`/readyz`).

pub mod health;
pub mod vehicles;
