//! `doorkeep-auth` — pure identity domain.
//!
//! User and session records, the adaptive password policy, and session token
//! generation. This crate is intentionally decoupled from HTTP and storage.

pub mod password;
pub mod session;
pub mod token;
pub mod user;

pub use password::{PasswordError, PasswordPolicy};
pub use session::{SESSION_TTL_MS, Session, session_ttl};
pub use token::{SESSION_TOKEN_BYTES, generate_session_token};
pub use user::{NewUser, User, UserPatch};
