//! `doorkeep-api`: HTTP surface of the service.
//!
//! Binds the domain crates to axum: routing, cookie handling, request
//! mapping and the error contract live here.

pub mod app;
pub mod config;
