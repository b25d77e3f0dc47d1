//! `doorkeep-infra` — storage layer: Postgres stores, embedded migrations,
//! database health.

pub mod db;
pub mod migrator;
pub mod session_store;
pub mod status;
pub mod user_store;

pub use db::connect_pool;
pub use migrator::{MigrationReport, pending_migrations, run_pending_migrations};
pub use session_store::{InMemorySessionStore, PostgresSessionStore, SessionStore};
pub use status::{DatabaseStatus, database_status};
pub use user_store::{InMemoryUserStore, PostgresUserStore, UserStore};
