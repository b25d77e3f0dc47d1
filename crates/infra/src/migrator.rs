//! Embedded schema migrations.
//!
//! The HTTP surface exposes a dry-run listing (`GET /api/v1/migrations`) and
//! an apply operation (`POST /api/v1/migrations`); both report the same
//! `{version, name}` shape.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::{Migrate, Migrator};

use doorkeep_core::{ApiError, ApiResult};

use crate::db::map_sqlx_error;

/// All schema migrations, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// One migration, as reported by the HTTP surface.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MigrationReport {
    pub version: i64,
    pub name: String,
}

/// Lists migrations that have not been applied yet. Dry run: the schema is
/// untouched apart from ensuring the bookkeeping table exists.
pub async fn pending_migrations(pool: &PgPool) -> ApiResult<Vec<MigrationReport>> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| map_sqlx_error("acquire_connection", e))?;

    conn.ensure_migrations_table()
        .await
        .map_err(|e| map_migrate_error("ensure_migrations_table", e))?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await
        .map_err(|e| map_migrate_error("list_applied_migrations", e))?
        .into_iter()
        .map(|m| m.version)
        .collect();

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .filter(|m| !applied.contains(&m.version))
        .map(|m| MigrationReport {
            version: m.version,
            name: m.description.to_string(),
        })
        .collect())
}

/// Applies all pending migrations and reports what ran (empty when the
/// schema was already current).
pub async fn run_pending_migrations(pool: &PgPool) -> ApiResult<Vec<MigrationReport>> {
    let pending = pending_migrations(pool).await?;
    if pending.is_empty() {
        return Ok(pending);
    }

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| map_migrate_error("run_migrations", e))?;
    tracing::info!(count = pending.len(), "applied pending migrations");
    Ok(pending)
}

fn map_migrate_error(operation: &str, err: sqlx::migrate::MigrateError) -> ApiError {
    ApiError::internal(anyhow::Error::new(err).context(format!("migration error in {operation}")))
}
