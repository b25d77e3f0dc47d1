//! Database health probe for the status endpoint.

use serde::Serialize;
use sqlx::PgPool;

use doorkeep_core::{ApiError, ApiResult};

use crate::db::map_sqlx_error;

/// Dependency snapshot reported by `GET /api/v1/status`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DatabaseStatus {
    pub version: String,
    pub max_connections: i64,
    pub opened_connections: i64,
}

/// Reads the server version, the connection ceiling and the number of
/// connections currently open against this pool's database.
pub async fn database_status(pool: &PgPool) -> ApiResult<DatabaseStatus> {
    let version: String = sqlx::query_scalar("SHOW server_version")
        .fetch_one(pool)
        .await
        .map_err(|e| map_sqlx_error("show_server_version", e))?;

    // SHOW always answers in text.
    let max_connections_raw: String = sqlx::query_scalar("SHOW max_connections")
        .fetch_one(pool)
        .await
        .map_err(|e| map_sqlx_error("show_max_connections", e))?;
    let max_connections = max_connections_raw.trim().parse::<i64>().map_err(|e| {
        ApiError::internal(anyhow::Error::new(e).context("parsing max_connections"))
    })?;

    let opened_connections: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM pg_stat_activity WHERE datname = current_database()",
    )
    .fetch_one(pool)
    .await
    .map_err(|e| map_sqlx_error("count_opened_connections", e))?;

    Ok(DatabaseStatus {
        version,
        max_connections,
        opened_connections,
    })
}
