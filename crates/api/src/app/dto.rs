//! Request bodies and their mapping into domain inputs.

use serde::Deserialize;

use doorkeep_auth::{NewUser, UserPatch};

/// Body of `POST /api/v1/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(body: CreateUserRequest) -> Self {
        NewUser {
            username: body.username,
            email: body.email,
            password: body.password,
        }
    }
}

/// Body of `PATCH /api/v1/users/:username`. Absent fields stay untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(body: UpdateUserRequest) -> Self {
        UserPatch {
            username: body.username,
            email: body.email,
            password: body.password,
        }
    }
}

/// Body of `POST /api/v1/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_tolerates_partial_input() {
        let body: UpdateUserRequest = serde_json::from_str(r#"{"email":"new@mail.test"}"#).unwrap();
        let patch = UserPatch::from(body);

        assert_eq!(patch.email.as_deref(), Some("new@mail.test"));
        assert!(patch.username.is_none());
        assert!(patch.password.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_update_body_maps_to_an_empty_patch() {
        let body: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(UserPatch::from(body).is_empty());
    }
}
