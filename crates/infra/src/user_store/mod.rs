//! Identity storage boundary.
//!
//! The contract plus two implementations: Postgres for real deployments,
//! in-memory for tests and database-less development. Both enforce
//! case-insensitive uniqueness of username and email and surface the same
//! canned taxonomy errors.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use r#trait::{
    UserStore, credentials_mismatch, email_not_found, email_taken, id_not_found,
    username_not_found, username_taken,
};
