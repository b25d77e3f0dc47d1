//! Dependency health.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use doorkeep_core::ApiResult;
use doorkeep_infra::database_status;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(show).fallback(errors::method_not_allowed))
}

/// `GET /api/v1/status`
pub async fn show(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match snapshot(&services).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn snapshot(services: &AppServices) -> ApiResult<Response> {
    let database = database_status(services.pool()?).await?;
    let body = json!({
        "updated_at": Utc::now(),
        "dependencies": {
            "database": database,
        },
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}
