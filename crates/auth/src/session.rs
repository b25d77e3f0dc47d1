//! Session records and lifetime rules.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Session lifetime: 30 days, kept in milliseconds because the cookie
/// max-age derives from it by integer division by 1000.
pub const SESSION_TTL_MS: i64 = 30 * 24 * 60 * 60 * 1000;

pub fn session_ttl() -> Duration {
    Duration::milliseconds(SESSION_TTL_MS)
}

/// A stored session. `token` is the opaque bearer credential carried by the
/// `session_id` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Validity rule: `expires_at` strictly in the future. A session whose
    /// `expires_at` equals "now" is already expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
