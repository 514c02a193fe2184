use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A live session joined with the owning user's name.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub user_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionRow {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
