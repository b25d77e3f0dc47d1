use async_trait::async_trait;
use uuid::Uuid;

use doorkeep_auth::{NewUser, User, UserPatch};
use doorkeep_core::{ApiError, ApiResult};

/// Identity storage contract.
///
/// Uniqueness and lookups on `username` and `email` are case-insensitive;
/// stored casing is preserved for display. Implementations own password
/// handling end to end: plaintext comes in through `create`, `update` and
/// `authenticate`, and only hashes ever come back out (inside the returned
/// records). Nothing else in the service touches the password policy.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Registers a user. Fails with a field-specific `ValidationError` when
    /// the username or email is already taken, whether the pre-check or the
    /// database constraint catches it. The returned record has
    /// `updated_at == created_at`.
    async fn create(&self, new_user: NewUser) -> ApiResult<User>;

    /// Case-insensitive lookup.
    async fn find_one_by_username(&self, username: &str) -> ApiResult<User>;

    async fn find_one_by_id(&self, id: Uuid) -> ApiResult<User>;

    /// Case-insensitive lookup.
    async fn find_one_by_email(&self, email: &str) -> ApiResult<User>;

    /// Partial update of the user currently known by `username`. Uniqueness
    /// is re-validated only for supplied fields, excluding the record itself
    /// (re-casing one's own username is allowed). A supplied password is
    /// re-hashed. `updated_at` moves strictly forward.
    async fn update(&self, username: &str, patch: UserPatch) -> ApiResult<User>;

    /// Login check. Unknown email and wrong password collapse into the same
    /// [`credentials_mismatch`] error, so callers cannot probe which failed.
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<User>;
}

// Canned errors forming part of the contract above. Texts are fixed; tests
// assert on them verbatim.

pub fn username_taken() -> ApiError {
    ApiError::validation(
        "The username provided is already in use.",
        "Use another username for this operation.",
    )
}

pub fn email_taken() -> ApiError {
    ApiError::validation(
        "The email provided is already in use.",
        "Use another email for this operation.",
    )
}

pub fn username_not_found() -> ApiError {
    ApiError::not_found(
        "The username provided was not found in the system.",
        "Check that the username is typed correctly.",
    )
}

pub fn id_not_found() -> ApiError {
    ApiError::not_found(
        "The id provided was not found in the system.",
        "Check that the id is typed correctly.",
    )
}

pub fn email_not_found() -> ApiError {
    ApiError::not_found(
        "The email provided was not found in the system.",
        "Check that the email is typed correctly.",
    )
}

pub fn credentials_mismatch() -> ApiError {
    ApiError::unauthorized(
        "Authentication data does not match.",
        "Check that the data sent is correct.",
    )
}
