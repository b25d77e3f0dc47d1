//! Postgres-backed session store.
//!
//! "Now" is always taken from the injected clock and bound as a parameter,
//! including in the validity predicate, so the database clock never decides
//! whether a session is alive.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use doorkeep_auth::{Session, generate_session_token, session_ttl};
use doorkeep_core::{ApiResult, Clock, SystemClock};

use super::r#trait::{SessionStore, no_active_session, session_id_not_found};
use crate::db::map_sqlx_error;

const SESSION_COLUMNS: &str = "id, token, user_id, expires_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    #[instrument(skip_all, fields(user_id = %user_id), err)]
    async fn create(&self, user_id: Uuid) -> ApiResult<Session> {
        let token = generate_session_token();
        let now = self.clock.now();
        let expires_at = now + session_ttl();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO sessions (id, token, user_id, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {SESSION_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_session", e))?;

        decode_session(&row)
    }

    #[instrument(skip_all, err)]
    async fn find_one_valid_by_token(&self, token: &str) -> ApiResult<Session> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE token = $1 AND expires_at > $2
            LIMIT 1
            "#,
        ))
        .bind(token)
        .bind(self.clock.now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_valid_session", e))?;

        match row {
            Some(row) => decode_session(&row),
            None => Err(no_active_session()),
        }
    }

    #[instrument(skip_all, fields(session_id = %session_id), err)]
    async fn renew(&self, session_id: Uuid) -> ApiResult<Session> {
        let now = self.clock.now();
        let expires_at = now + session_ttl();

        let row = sqlx::query(&format!(
            r#"
            UPDATE sessions
            SET expires_at = $2, updated_at = $3
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#,
        ))
        .bind(session_id)
        .bind(expires_at)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("renew_session", e))?;

        match row {
            Some(row) => decode_session(&row),
            None => Err(session_id_not_found()),
        }
    }

    #[instrument(skip_all, fields(session_id = %session_id), err)]
    async fn revoke(&self, session_id: Uuid) -> ApiResult<Session> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE sessions
            SET expires_at = $2, updated_at = $3
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#,
        ))
        .bind(session_id)
        .bind(DateTime::<Utc>::UNIX_EPOCH)
        .bind(self.clock.now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_session", e))?;

        match row {
            Some(row) => decode_session(&row),
            None => Err(session_id_not_found()),
        }
    }
}

fn decode_session(row: &sqlx::postgres::PgRow) -> ApiResult<Session> {
    SessionRow::from_row(row)
        .map(Session::from)
        .map_err(|e| map_sqlx_error("decode_session_row", e))
}

// SQLx row types

#[derive(Debug)]
struct SessionRow {
    id: Uuid,
    token: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SessionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SessionRow {
            id: row.try_get("id")?,
            token: row.try_get("token")?,
            user_id: row.try_get("user_id")?,
            expires_at: row.try_get("expires_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            token: row.token,
            user_id: row.user_id,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
