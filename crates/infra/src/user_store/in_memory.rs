//! In-memory identity store.
//!
//! Intended for tests and database-less development. Same contract as the
//! Postgres store; the write lock stands in for the unique indexes (the
//! availability check and the insert happen under one guard).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use doorkeep_auth::{NewUser, PasswordPolicy, User, UserPatch};
use doorkeep_core::{ApiError, ApiResult, Clock, SystemClock};

use super::r#trait::{
    UserStore, credentials_mismatch, email_not_found, email_taken, id_not_found,
    username_not_found, username_taken,
};

#[derive(Debug)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
    policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserStore {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: PasswordPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            policy,
            clock,
        }
    }
}

fn lock_poisoned() -> ApiError {
    ApiError::internal(anyhow::anyhow!("user store lock poisoned"))
}

fn same_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> ApiResult<User> {
        let hashed = self
            .policy
            .hash(&new_user.password)
            .map_err(ApiError::internal)?;
        let now = self.clock.now();

        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        if users
            .iter()
            .any(|u| same_fold(&u.username, &new_user.username))
        {
            return Err(username_taken());
        }
        if users.iter().any(|u| same_fold(&u.email, &new_user.email)) {
            return Err(email_taken());
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password: hashed,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_one_by_username(&self, username: &str) -> ApiResult<User> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        users
            .iter()
            .find(|u| same_fold(&u.username, username))
            .cloned()
            .ok_or_else(username_not_found)
    }

    async fn find_one_by_id(&self, id: Uuid) -> ApiResult<User> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(id_not_found)
    }

    async fn find_one_by_email(&self, email: &str) -> ApiResult<User> {
        let users = self.users.read().map_err(|_| lock_poisoned())?;
        users
            .iter()
            .find(|u| same_fold(&u.email, email))
            .cloned()
            .ok_or_else(email_not_found)
    }

    async fn update(&self, username: &str, patch: UserPatch) -> ApiResult<User> {
        // Hash outside the lock; scrypt has no business holding up readers.
        let hashed = match &patch.password {
            Some(plaintext) => Some(self.policy.hash(plaintext).map_err(ApiError::internal)?),
            None => None,
        };
        let now = self.clock.now();

        let mut users = self.users.write().map_err(|_| lock_poisoned())?;
        let position = users
            .iter()
            .position(|u| same_fold(&u.username, username))
            .ok_or_else(username_not_found)?;
        let current_id = users[position].id;

        if let Some(new_username) = &patch.username {
            if users
                .iter()
                .any(|u| u.id != current_id && same_fold(&u.username, new_username))
            {
                return Err(username_taken());
            }
        }
        if let Some(new_email) = &patch.email {
            if users
                .iter()
                .any(|u| u.id != current_id && same_fold(&u.email, new_email))
            {
                return Err(email_taken());
            }
        }

        let user = &mut users[position];
        if let Some(new_username) = patch.username {
            user.username = new_username;
        }
        if let Some(new_email) = patch.email {
            user.email = new_email;
        }
        if let Some(hashed) = hashed {
            user.password = hashed;
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<User> {
        let user = match self.find_one_by_email(email).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => return Err(credentials_mismatch()),
            Err(err) => return Err(err),
        };

        let matches = self
            .policy
            .compare(password, &user.password)
            .map_err(ApiError::internal)?;
        if matches {
            Ok(user)
        } else {
            Err(credentials_mismatch())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use doorkeep_core::{Environment, ManualClock};

    fn store() -> InMemoryUserStore {
        InMemoryUserStore::new(PasswordPolicy::for_environment(Environment::Test))
    }

    fn store_with_clock(clock: Arc<ManualClock>) -> InMemoryUserStore {
        InMemoryUserStore::with_clock(PasswordPolicy::for_environment(Environment::Test), clock)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            email: email.to_owned(),
            password: "s3nha-forte".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_complete_record() {
        let store = store();
        let user = store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        assert_eq!(user.id.get_version_num(), 4);
        assert_eq!(user.username, "MichaelScott");
        assert_eq!(user.email, "michael@dundermifflin.com");
        assert_eq!(user.updated_at, user.created_at);
        // Stored value must be a hash, never the plaintext.
        assert_ne!(user.password, "s3nha-forte");
        assert!(user.password.starts_with("$scrypt$"));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_case_insensitively() {
        let store = store();
        store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        let err = store
            .create(new_user("michaelscott", "other@dundermifflin.com"))
            .await
            .unwrap_err();
        let public = err.to_public();
        assert_eq!(public.name, "ValidationError");
        assert_eq!(public.message, "The username provided is already in use.");
        assert_eq!(public.action, "Use another username for this operation.");
        assert_eq!(public.status_code, 400);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = store();
        store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        let err = store
            .create(new_user("DwightSchrute", "MICHAEL@dundermifflin.com"))
            .await
            .unwrap_err();
        let public = err.to_public();
        assert_eq!(public.name, "ValidationError");
        assert_eq!(public.message, "The email provided is already in use.");
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_and_preserves_stored_casing() {
        let store = store();
        store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        let found = store.find_one_by_username("michaelscott").await.unwrap();
        assert_eq!(found.username, "MichaelScott");

        let by_email = store
            .find_one_by_email("MICHAEL@dundermifflin.com")
            .await
            .unwrap();
        assert_eq!(by_email.email, "michael@dundermifflin.com");
    }

    #[tokio::test]
    async fn unknown_lookups_raise_specific_not_found_errors() {
        let store = store();

        let by_username = store.find_one_by_username("nobody").await.unwrap_err();
        assert_eq!(
            by_username.to_public().message,
            "The username provided was not found in the system."
        );

        let by_id = store.find_one_by_id(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(
            by_id.to_public().message,
            "The id provided was not found in the system."
        );

        let by_email = store.find_one_by_email("no@body.com").await.unwrap_err();
        assert_eq!(
            by_email.to_public().message,
            "The email provided was not found in the system."
        );
    }

    #[tokio::test]
    async fn update_moves_updated_at_strictly_forward() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = store_with_clock(clock.clone());
        let created = store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        clock.advance(Duration::seconds(5));
        let updated = store
            .update("MichaelScott", UserPatch::default())
            .await
            .unwrap();

        assert!(updated.updated_at > created.created_at);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.username, "MichaelScott");
    }

    #[tokio::test]
    async fn update_rejects_a_taken_username_and_changes_nothing() {
        let store = store();
        store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();
        store
            .create(new_user("DwightSchrute", "dwight@dundermifflin.com"))
            .await
            .unwrap();

        let err = store
            .update(
                "DwightSchrute",
                UserPatch {
                    username: Some("michaelscott".to_owned()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_public().message,
            "The username provided is already in use."
        );

        let untouched = store.find_one_by_username("DwightSchrute").await.unwrap();
        assert_eq!(untouched.username, "DwightSchrute");
        assert_eq!(untouched.updated_at, untouched.created_at);
    }

    #[tokio::test]
    async fn update_allows_recasing_your_own_username() {
        let store = store();
        store
            .create(new_user("michaelscott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        let updated = store
            .update(
                "michaelscott",
                UserPatch {
                    username: Some("MichaelScott".to_owned()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "MichaelScott");
    }

    #[tokio::test]
    async fn update_rehashes_a_supplied_password() {
        let store = store();
        store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        store
            .update(
                "MichaelScott",
                UserPatch {
                    password: Some("new-password".to_owned()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();

        assert!(
            store
                .authenticate("michael@dundermifflin.com", "new-password")
                .await
                .is_ok()
        );
        assert!(
            store
                .authenticate("michael@dundermifflin.com", "s3nha-forte")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn authenticate_does_not_reveal_which_credential_failed() {
        let store = store();
        store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        let wrong_password = store
            .authenticate("michael@dundermifflin.com", "wrong")
            .await
            .unwrap_err();
        let unknown_email = store
            .authenticate("nobody@dundermifflin.com", "s3nha-forte")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_public(), unknown_email.to_public());
        assert_eq!(
            wrong_password.to_public().message,
            "Authentication data does not match."
        );
        assert_eq!(wrong_password.to_public().status_code, 401);
    }

    #[tokio::test]
    async fn authenticate_returns_the_user_on_matching_credentials() {
        let store = store();
        let created = store
            .create(new_user("MichaelScott", "michael@dundermifflin.com"))
            .await
            .unwrap();

        let user = store
            .authenticate("Michael@DunderMifflin.com", "s3nha-forte")
            .await
            .unwrap();
        assert_eq!(user.id, created.id);
    }
}
