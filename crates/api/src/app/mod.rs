//! HTTP application wiring.
//!
//! - `services.rs`: store selection and the shared service graph
//! - `routes/`: HTTP routes and handlers, one file per resource
//! - `dto.rs`: request bodies and their mapping into domain inputs
//! - `errors.rs`: taxonomy-shaped responses and router fallbacks
//! - `cookies.rs`: session cookie directives

use std::sync::Arc;

use axum::extract::Extension;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod cookies;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Assembles the full router around an already-built service graph.
///
/// Unmatched paths answer with the taxonomy's not-found shape, so even a
/// mistyped URL stays inside the error contract.
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .nest("/api/v1", routes::router())
        .fallback(errors::route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(Arc::new(services))),
        )
}
