//! Store selection and the shared service graph.

use std::sync::Arc;

use sqlx::PgPool;

use doorkeep_auth::PasswordPolicy;
use doorkeep_core::{ApiError, ApiResult, Environment};
use doorkeep_infra::{
    InMemorySessionStore, InMemoryUserStore, PostgresSessionStore, PostgresUserStore, SessionStore,
    UserStore, connect_pool,
};

use super::cookies::CookiePolicy;
use crate::config::AppConfig;

/// Everything a handler needs, built once at startup and shared via
/// `Extension<Arc<AppServices>>`.
pub struct AppServices {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    pool: Option<PgPool>,
    environment: Environment,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        pool: Option<PgPool>,
        environment: Environment,
    ) -> Self {
        Self {
            users,
            sessions,
            pool,
            environment,
        }
    }

    /// Fully in-memory graph for tests and database-less development.
    pub fn in_memory(environment: Environment) -> Self {
        let policy = PasswordPolicy::for_environment(environment);
        Self::new(
            Arc::new(InMemoryUserStore::new(policy)),
            Arc::new(InMemorySessionStore::new()),
            None,
            environment,
        )
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::for_environment(self.environment)
    }

    /// Raw pool for the endpoints that speak to Postgres directly (status,
    /// migrations). Fails as an internal error when running in-memory.
    pub fn pool(&self) -> ApiResult<&PgPool> {
        self.pool.as_ref().ok_or_else(|| {
            ApiError::internal(anyhow::anyhow!(
                "no database configured (DATABASE_URL unset); this endpoint requires Postgres"
            ))
        })
    }
}

/// Builds the service graph from configuration: Postgres-backed stores when a
/// database URL is present, otherwise the in-memory fallback.
pub async fn build_services(config: &AppConfig) -> ApiResult<AppServices> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores (state is lost on restart)");
        return Ok(AppServices::in_memory(config.environment));
    };

    let pool = connect_pool(database_url).await?;
    tracing::info!("connected to postgres");

    let policy = PasswordPolicy::for_environment(config.environment);
    Ok(AppServices::new(
        Arc::new(PostgresUserStore::new(pool.clone(), policy)),
        Arc::new(PostgresSessionStore::new(pool.clone())),
        Some(pool),
        config.environment,
    ))
}
