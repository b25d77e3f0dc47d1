//! User records and inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A stored user.
///
/// `password` is the adaptive hash produced by [`crate::PasswordPolicy`],
/// never a plaintext. The record serializes whole; the stored hash is part of
/// the API contract for user responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input. `password` is plaintext on the way in; only the
/// identity store turns it into a hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update. Absent fields keep their current value; a present
/// `password` is re-hashed on write.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}
