//! In-memory session store.
//!
//! Intended for tests and database-less development.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use doorkeep_auth::{Session, generate_session_token, session_ttl};
use doorkeep_core::{ApiError, ApiResult, Clock, SystemClock};

use super::r#trait::{SessionStore, no_active_session, session_id_not_found};

#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: RwLock<Vec<Session>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(Vec::new()),
            clock,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_poisoned() -> ApiError {
    ApiError::internal(anyhow::anyhow!("session store lock poisoned"))
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, user_id: Uuid) -> ApiResult<Session> {
        let now = self.clock.now();
        let session = Session {
            id: Uuid::new_v4(),
            token: generate_session_token(),
            user_id,
            expires_at: now + session_ttl(),
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_one_valid_by_token(&self, token: &str) -> ApiResult<Session> {
        let now = self.clock.now();
        let sessions = self.sessions.read().map_err(|_| lock_poisoned())?;
        sessions
            .iter()
            .find(|s| s.token == token && s.is_active(now))
            .cloned()
            .ok_or_else(no_active_session)
    }

    async fn renew(&self, session_id: Uuid) -> ApiResult<Session> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(session_id_not_found)?;

        session.expires_at = now + session_ttl();
        session.updated_at = now;
        Ok(session.clone())
    }

    async fn revoke(&self, session_id: Uuid) -> ApiResult<Session> {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned())?;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(session_id_not_found)?;

        session.expires_at = DateTime::<Utc>::UNIX_EPOCH;
        session.updated_at = now;
        Ok(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use doorkeep_core::ManualClock;

    fn store_with_clock() -> (InMemorySessionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (InMemorySessionStore::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn create_issues_a_full_ttl_session() {
        let (store, clock) = store_with_clock();
        let user_id = Uuid::new_v4();

        let session = store.create(user_id).await.unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.token.len(), 96);
        assert_eq!(session.expires_at, clock.now() + Duration::days(30));
        assert_eq!(session.updated_at, session.created_at);
        assert_eq!(session.id.get_version_num(), 4);
    }

    #[tokio::test]
    async fn consecutive_sessions_get_distinct_tokens() {
        let (store, _clock) = store_with_clock();
        let a = store.create(Uuid::new_v4()).await.unwrap();
        let b = store.create(Uuid::new_v4()).await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn a_valid_token_resolves_to_its_session() {
        let (store, _clock) = store_with_clock();
        let created = store.create(Uuid::new_v4()).await.unwrap();

        let found = store.find_one_valid_by_token(&created.token).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn expired_and_unknown_tokens_fail_identically() {
        let (store, clock) = store_with_clock();
        let created = store.create(Uuid::new_v4()).await.unwrap();

        clock.advance(Duration::days(30) + Duration::seconds(1));
        let expired = store
            .find_one_valid_by_token(&created.token)
            .await
            .unwrap_err();
        let unknown = store
            .find_one_valid_by_token(&"f".repeat(96))
            .await
            .unwrap_err();

        assert_eq!(expired.to_public(), unknown.to_public());
        assert_eq!(expired.to_public().message, "User has no active session.");
        assert_eq!(
            expired.to_public().action,
            "Check that this user is logged in and try again."
        );
        assert_eq!(expired.to_public().status_code, 401);
    }

    #[tokio::test]
    async fn expiry_boundary_is_exclusive() {
        let (store, clock) = store_with_clock();
        let created = store.create(Uuid::new_v4()).await.unwrap();

        // One millisecond before expiry the session is still valid.
        clock.set(created.expires_at - Duration::milliseconds(1));
        assert!(store.find_one_valid_by_token(&created.token).await.is_ok());

        // At exactly expires_at it no longer is.
        clock.set(created.expires_at);
        assert!(store.find_one_valid_by_token(&created.token).await.is_err());
    }

    #[tokio::test]
    async fn renew_extends_expiry_without_touching_the_token() {
        let (store, clock) = store_with_clock();
        let created = store.create(Uuid::new_v4()).await.unwrap();

        clock.advance(Duration::hours(1));
        let renewed = store.renew(created.id).await.unwrap();

        assert_eq!(renewed.token, created.token);
        assert_eq!(renewed.user_id, created.user_id);
        assert_eq!(renewed.created_at, created.created_at);
        assert_eq!(renewed.expires_at, created.expires_at + Duration::hours(1));
        assert!(renewed.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn renew_rejects_an_unknown_id() {
        let (store, _clock) = store_with_clock();
        let err = store.renew(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_public().name, "NotFoundError");
    }

    #[tokio::test]
    async fn revoke_pins_expiry_to_the_epoch() {
        let (store, _clock) = store_with_clock();
        let created = store.create(Uuid::new_v4()).await.unwrap();

        let revoked = store.revoke(created.id).await.unwrap();
        assert_eq!(revoked.expires_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(revoked.token, created.token);

        let err = store
            .find_one_valid_by_token(&created.token)
            .await
            .unwrap_err();
        assert_eq!(err.to_public().message, "User has no active session.");
    }

    #[tokio::test]
    async fn revoke_is_idempotent_on_expires_at() {
        let (store, clock) = store_with_clock();
        let created = store.create(Uuid::new_v4()).await.unwrap();

        let first = store.revoke(created.id).await.unwrap();
        clock.advance(Duration::minutes(10));
        let second = store.revoke(created.id).await.unwrap();

        assert_eq!(first.expires_at, second.expires_at);
        assert_eq!(second.expires_at, DateTime::<Utc>::UNIX_EPOCH);
    }
}
