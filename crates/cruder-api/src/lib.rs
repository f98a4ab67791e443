//! # cruder-api: HTTP Service for the User Resource
//!
//! Axum surface over the `cruder-core` business layer, with Postgres
//! persistence, a shared-secret API-key gate and a structured request logger.
//!
//! ## API Surface
//!
//! | Prefix | Module | Auth |
//! |---|---|---|
//! | `/api/v1/users*` | [`routes::users`] | `X-API-Key` |
//! | `/api/v1/openapi.json` | [`openapi`] | `X-API-Key` |
//! | `/health/*` | this module | none |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! RequestLog → ApiKey → Handler
//! ```
//!
//! The request logger wraps everything, health probes included, so rejected
//! requests are recorded with their final status.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::auth::ApiKeyConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// `api_key` is the only copy of the secret the router holds; the gate reads
/// it from request extensions. Health probes (`/health/*`) are mounted
/// outside the API-key middleware so they remain accessible without
/// credentials.
pub fn app(state: AppState, api_key: ApiKeyConfig) -> Router {
    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::users::router())
        .merge(openapi::router())
        .layer(from_fn(auth::api_key_middleware))
        .layer(axum::Extension(api_key))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(health)
        .merge(api)
        .layer(from_fn(middleware::request_log::request_log_middleware))
}

/// Liveness probe: 200 while the process is up.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}
