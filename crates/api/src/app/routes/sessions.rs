//! Login and logout.

use std::sync::Arc;

use axum::extract::Extension;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use doorkeep_core::ApiResult;

use crate::app::services::AppServices;
use crate::app::{cookies, dto, errors};

pub fn router() -> Router {
    Router::new().route(
        "/",
        post(create)
            .delete(destroy)
            .fallback(errors::method_not_allowed),
    )
}

/// `POST /api/v1/sessions`
///
/// Exchanges credentials for a fresh session. The token travels both in the
/// body and in the session cookie.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateSessionRequest>, JsonRejection>,
) -> Response {
    match login(&services, payload).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn login(
    services: &AppServices,
    payload: Result<Json<dto::CreateSessionRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = payload.map_err(errors::invalid_body)?;
    let user = services
        .users()
        .authenticate(&body.email, &body.password)
        .await?;
    let session = services.sessions().create(user.id).await?;

    let directive = cookies::set_session_cookie(services.cookie_policy(), &session.token);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, directive)],
        Json(session),
    )
        .into_response())
}

/// `DELETE /api/v1/sessions`
///
/// Revokes the session named by the cookie and tells the client to drop it.
pub async fn destroy(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    match logout(&services, &headers).await {
        Ok(response) => response,
        Err(err) => errors::error_to_response(err, services.cookie_policy()),
    }
}

async fn logout(services: &AppServices, headers: &HeaderMap) -> ApiResult<Response> {
    let token = cookies::session_token(headers).unwrap_or_default();
    let session = services.sessions().find_one_valid_by_token(&token).await?;
    let revoked = services.sessions().revoke(session.id).await?;

    let directive = cookies::clear_session_cookie(services.cookie_policy());
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, directive)],
        Json(revoked),
    )
        .into_response())
}
