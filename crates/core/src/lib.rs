//! `doorkeep-core` — shared foundation for the authentication service.
//!
//! This crate contains **pure building blocks** (no HTTP or storage
//! concerns): the public error taxonomy, the deployment environment, and an
//! injectable clock.

pub mod clock;
pub mod environment;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use environment::Environment;
pub use error::{ApiError, ApiResult, PublicError};
