//! The authenticated user's own record.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use doorkeep_core::ApiResult;

use crate::app::services::AppServices;
use crate::app::{cookies, errors};

/// Session answers must never be cached by intermediaries.
const NO_CACHE: &str = "no-store, no-cache, max-age=0, must-revalidate";

pub fn router() -> Router {
    Router::new().route("/", get(show).fallback(errors::method_not_allowed))
}

/// `GET /api/v1/user`
///
/// Resolves the cookie's session to its owner. Every successful call renews
/// the session and re-issues the cookie with a full TTL.
pub async fn show(Extension(services): Extension<Arc<AppServices>>, headers: HeaderMap) -> Response {
    match current_user(&services, &headers).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn current_user(services: &AppServices, headers: &HeaderMap) -> ApiResult<Response> {
    let token = cookies::session_token(headers).unwrap_or_default();
    let session = services.sessions().find_one_valid_by_token(&token).await?;
    let renewed = services.sessions().renew(session.id).await?;
    let user = services.users().find_one_by_id(renewed.user_id).await?;

    let directive = cookies::set_session_cookie(services.cookie_policy(), &renewed.token);
    Ok((
        StatusCode::OK,
        [
            (header::SET_COOKIE, directive),
            (header::CACHE_CONTROL, NO_CACHE.to_owned()),
        ],
        Json(user),
    )
        .into_response())
}
