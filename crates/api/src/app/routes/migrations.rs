//! Schema migration orchestration.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use doorkeep_core::ApiResult;
use doorkeep_infra::{pending_migrations, run_pending_migrations};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route(
        "/",
        get(list).post(run).fallback(errors::method_not_allowed),
    )
}

/// `GET /api/v1/migrations`
///
/// Dry run: lists what `POST` would apply, without touching the schema.
pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match pending(&services).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn pending(services: &AppServices) -> ApiResult<Response> {
    let reports = pending_migrations(services.pool()?).await?;
    Ok((StatusCode::OK, Json(reports)).into_response())
}

/// `POST /api/v1/migrations`
///
/// Applies every pending migration. Answers 201 when at least one ran and
/// 200 when the schema was already current.
pub async fn run(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match apply(&services).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn apply(services: &AppServices) -> ApiResult<Response> {
    let applied = run_pending_migrations(services.pool()?).await?;
    let status = if applied.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(applied)).into_response())
}
