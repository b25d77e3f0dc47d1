//! Postgres pool construction and sqlx error glue.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use doorkeep_core::{ApiError, ApiResult};

/// Connects a pool sized for a small API service.
pub async fn connect_pool(database_url: &str) -> ApiResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect_pool", e))
}

/// Wraps a driver error as an internal taxonomy error, tagged with the
/// operation that failed. Anything the stores do not explicitly translate
/// (unique violations, mostly) funnels through here.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ApiError {
    ApiError::internal(anyhow::Error::new(err).context(format!("database error in {operation}")))
}

/// Postgres unique-violation detection (SQLSTATE 23505).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

/// Name of the constraint a database error violated, when the driver
/// reports one.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
