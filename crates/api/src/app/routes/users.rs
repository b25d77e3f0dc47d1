//! Registration and per-username operations.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use doorkeep_core::ApiResult;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create).fallback(errors::method_not_allowed))
        .route(
            "/:username",
            get(show).patch(update).fallback(errors::method_not_allowed),
        )
}

/// `POST /api/v1/users`
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> Response {
    match register(&services, payload).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn register(
    services: &AppServices,
    payload: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload.map_err(errors::invalid_body)?;
    let user = services.users().create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// `GET /api/v1/users/:username`
pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Path(username): Path<String>,
) -> Response {
    match services.users().find_one_by_username(&username).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

/// `PATCH /api/v1/users/:username`
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Path(username): Path<String>,
    payload: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Response {
    match apply_patch(&services, &username, payload).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn apply_patch(
    services: &AppServices,
    username: &str,
    payload: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload.map_err(errors::invalid_body)?;
    let user = services.users().update(username, body.into()).await?;
    Ok((StatusCode::OK, Json(user)).into_response())
}
