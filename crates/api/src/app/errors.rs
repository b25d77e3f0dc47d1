//! Terminal conversion of taxonomy errors into HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use doorkeep_core::ApiError;

use super::cookies::{self, CookiePolicy};

/// Renders `err` as its public JSON projection.
///
/// Internal errors are logged here under their correlation id; the client
/// sees only the public projection, with the same id as its `error_id`
/// reference. Unauthorized responses additionally instruct the client to
/// drop the session cookie.
pub fn error_to_response(err: ApiError, policy: CookiePolicy) -> Response {
    if let ApiError::Internal { error_id, cause } = &err {
        tracing::error!(error_id = %error_id, cause = ?cause, "request failed unexpectedly");
    }

    let clear_cookie = err.is_unauthorized();
    let mut response = public_response(&err);

    if clear_cookie {
        let directive = cookies::clear_session_cookie(policy);
        if let Ok(value) = HeaderValue::from_str(&directive) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Fallback for routes that exist but not under the requested method.
pub async fn method_not_allowed() -> Response {
    public_response(&ApiError::method_not_allowed())
}

/// Fallback for paths that match nothing.
pub async fn route_not_found() -> Response {
    public_response(&ApiError::resource_not_found())
}

/// Maps a body that axum could not deserialize onto the validation kind, so
/// malformed requests answer in the same shape as business-rule failures.
pub fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::validation(
        rejection.body_text(),
        "Adjust the data sent and try again.",
    )
}

fn public_response(err: &ApiError) -> Response {
    let public = err.to_public();
    let status = StatusCode::from_u16(public.status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(public)).into_response()
}
