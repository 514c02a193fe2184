//! Persistence layer: users, sessions, saved searches and usage counters.
//!
//! Handlers never talk to the database directly. They receive an
//! `Arc<dyn Store>` through `AppState`, which keeps the backing store swappable
//! (Postgres in production, an in-memory map in tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::search::{NewSearch, SearchRecord};
use crate::models::session::SessionRow;
use crate::models::stats::UsageStats;
use crate::models::user::UserRow;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username '{0}' already exists")]
    UsernameTaken(String),

    #[error("Stored payload could not be decoded: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts the user together with its zeroed stats row.
    async fn create_user(&self, username: &str, password_hash: &str)
        -> Result<UserRow, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRow>, StoreError>;

    /// Sets or clears (`None`) the user's stored provider credential.
    async fn set_api_key(&self, user_id: i64, api_key: Option<&str>) -> Result<(), StoreError>;

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, StoreError>;

    async fn find_session(&self, token: Uuid) -> Result<Option<SessionRow>, StoreError>;

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError>;

    async fn create_search(&self, search: NewSearch<'_>) -> Result<i64, StoreError>;

    /// Newest first, at most `limit` records.
    async fn list_searches(&self, user_id: i64, limit: i64)
        -> Result<Vec<SearchRecord>, StoreError>;

    /// Returns the record only when it belongs to `user_id`.
    async fn get_search(&self, search_id: i64, user_id: i64)
        -> Result<Option<SearchRecord>, StoreError>;

    /// Creation time of every search the user owns.
    async fn search_timestamps(&self, user_id: i64) -> Result<Vec<DateTime<Utc>>, StoreError>;

    /// Bumps search and API-call counters by one and stamps the last search time.
    async fn record_search_usage(&self, user_id: i64) -> Result<(), StoreError>;

    /// Zeroed stats when the user has no stats row.
    async fn get_stats(&self, user_id: i64) -> Result<UsageStats, StoreError>;
}
