use async_trait::async_trait;
use uuid::Uuid;

use doorkeep_auth::Session;
use doorkeep_core::{ApiError, ApiResult};

/// Session storage contract.
///
/// Tokens are opaque bearer credentials; implementations must never log
/// them. Validity is decided at read time (`expires_at` strictly in the
/// future); nothing schedules timers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issues a session for `user_id`: fresh CSPRNG token,
    /// `expires_at = now + TTL`. The returned record is where the raw token
    /// enters the world.
    async fn create(&self, user_id: Uuid) -> ApiResult<Session>;

    /// Single-lookup validity check. A token that is unknown and a token
    /// that expired fail identically with [`no_active_session`]; the caller
    /// cannot tell which happened.
    async fn find_one_valid_by_token(&self, token: &str) -> ApiResult<Session>;

    /// Pushes `expires_at` a full TTL forward from now, with no validity
    /// check of its own. Callers validate via `find_one_valid_by_token`
    /// first; token and `user_id` are untouched.
    async fn renew(&self, session_id: Uuid) -> ApiResult<Session>;

    /// Expires the session by pinning `expires_at` to the Unix epoch and
    /// returns the expired record. Idempotent: a second call leaves
    /// `expires_at` exactly where it was.
    async fn revoke(&self, session_id: Uuid) -> ApiResult<Session>;
}

/// The fixed failure for any token that does not resolve to an active
/// session.
pub fn no_active_session() -> ApiError {
    ApiError::unauthorized(
        "User has no active session.",
        "Check that this user is logged in and try again.",
    )
}

/// Raised by `renew`/`revoke` for an id that does not exist. Unreachable
/// through the HTTP flows (they validate first); kept diagnosable for
/// callers that break the protocol.
pub fn session_id_not_found() -> ApiError {
    ApiError::not_found(
        "The session id provided was not found in the system.",
        "Check that the session id is correct.",
    )
}
