//! HTTP routes, one module per resource.

use axum::Router;

pub mod migrations;
pub mod sessions;
pub mod status;
pub mod user;
pub mod users;

/// Everything served under `/api/v1`.
pub fn router() -> Router {
    Router::new()
        .nest("/status", status::router())
        .nest("/migrations", migrations::router())
        .nest("/users", users::router())
        .nest("/user", user::router())
        .nest("/sessions", sessions::router())
}
