//! Session storage boundary.
//!
//! The contract plus two implementations: Postgres for real deployments,
//! in-memory for tests and database-less development.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemorySessionStore;
pub use postgres::PostgresSessionStore;
pub use r#trait::{SessionStore, no_active_session, session_id_not_found};
