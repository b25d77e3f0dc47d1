//! Postgres-backed identity store.
//!
//! ## Uniqueness
//!
//! Username and email uniqueness gets two layers: an availability pre-check
//! (clear field-specific errors in the common case) and the
//! `users_username_unique` / `users_email_unique` indexes on
//! `LOWER(column)` (correctness under concurrent writers). A 23505 raised by
//! either index is translated back into the same `ValidationError` the
//! pre-check would have produced, so callers cannot tell which layer fired.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use doorkeep_auth::{NewUser, PasswordPolicy, User, UserPatch};
use doorkeep_core::{ApiError, ApiResult, Clock, SystemClock};

use super::r#trait::{
    UserStore, credentials_mismatch, email_not_found, email_taken, id_not_found,
    username_not_found, username_taken,
};
use crate::db::{is_unique_violation, map_sqlx_error, violated_constraint};

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
    policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool, policy: PasswordPolicy) -> Self {
        Self::with_clock(pool, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: PgPool, policy: PasswordPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            policy,
            clock,
        }
    }

    /// Availability pre-check, optionally excluding one record (the record
    /// being updated, so users may re-case their own username/email).
    async fn check_username_available(
        &self,
        username: &str,
        excluding: Option<Uuid>,
    ) -> ApiResult<()> {
        let taken: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*)
            FROM users
            WHERE LOWER(username) = LOWER($1)
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(username)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("check_username_available", e))?;

        if taken > 0 {
            return Err(username_taken());
        }
        Ok(())
    }

    async fn check_email_available(&self, email: &str, excluding: Option<Uuid>) -> ApiResult<()> {
        let taken: i64 = sqlx::query_scalar(
            r#"
            SELECT count(*)
            FROM users
            WHERE LOWER(email) = LOWER($1)
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(email)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("check_email_available", e))?;

        if taken > 0 {
            return Err(email_taken());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip_all, fields(username = %new_user.username), err)]
    async fn create(&self, new_user: NewUser) -> ApiResult<User> {
        self.check_username_available(&new_user.username, None)
            .await?;
        self.check_email_available(&new_user.email, None).await?;

        let hashed = self
            .policy
            .hash(&new_user.password)
            .map_err(ApiError::internal)?;
        let now = self.clock.now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, username, email, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&hashed)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_unique_violation("insert_user", e))?;

        decode_user(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_one_by_username(&self, username: &str) -> ApiResult<User> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE LOWER(username) = LOWER($1)
            LIMIT 1
            "#,
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_username", e))?;

        match row {
            Some(row) => decode_user(&row),
            None => Err(username_not_found()),
        }
    }

    #[instrument(skip(self), err)]
    async fn find_one_by_id(&self, id: Uuid) -> ApiResult<User> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            LIMIT 1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        match row {
            Some(row) => decode_user(&row),
            None => Err(id_not_found()),
        }
    }

    #[instrument(skip_all, err)]
    async fn find_one_by_email(&self, email: &str) -> ApiResult<User> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE LOWER(email) = LOWER($1)
            LIMIT 1
            "#,
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        match row {
            Some(row) => decode_user(&row),
            None => Err(email_not_found()),
        }
    }

    #[instrument(skip_all, fields(username = %username), err)]
    async fn update(&self, username: &str, patch: UserPatch) -> ApiResult<User> {
        let current = self.find_one_by_username(username).await?;

        if let Some(new_username) = &patch.username {
            self.check_username_available(new_username, Some(current.id))
                .await?;
        }
        if let Some(new_email) = &patch.email {
            self.check_email_available(new_email, Some(current.id))
                .await?;
        }

        let password = match &patch.password {
            Some(plaintext) => self.policy.hash(plaintext).map_err(ApiError::internal)?,
            None => current.password,
        };
        let merged_username = patch.username.unwrap_or(current.username);
        let merged_email = patch.email.unwrap_or(current.email);
        let now = self.clock.now();

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET username = $2, email = $3, password = $4, updated_at = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(current.id)
        .bind(&merged_username)
        .bind(&merged_email)
        .bind(&password)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_unique_violation("update_user", e))?;

        decode_user(&row)
    }

    #[instrument(skip_all, err)]
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

/// Maps a 23505 from one of the uniqueness indexes onto the matching
/// field-specific validation error; everything else stays a wrapped driver
/// error.
fn translate_unique_violation(operation: &str, err: sqlx::Error) -> ApiError {
    if is_unique_violation(&err) {
        match violated_constraint(&err) {
            Some("users_username_unique") => return username_taken(),
            Some("users_email_unique") => return email_taken(),
            _ => {}
        }
    }
    map_sqlx_error(operation, err)
}

fn decode_user(row: &sqlx::postgres::PgRow) -> ApiResult<User> {
    UserRow::from_row(row)
        .map(User::from)
        .map_err(|e| map_sqlx_error("decode_user_row", e))
}

// SQLx row types

#[derive(Debug)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
