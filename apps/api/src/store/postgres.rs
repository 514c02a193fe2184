use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::search::{NewSearch, SearchRecord, SearchRow};
use crate::models::session::SessionRow;
use crate::models::stats::UsageStats;
use crate::models::user::UserRow;
use crate::store::{Store, StoreError};

/// Postgres-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, api_key, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::UsernameTaken(username.to_string())
            }
            other => StoreError::Database(other),
        })?;

        sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn set_api_key(&self, user_id: i64, api_key: Option<&str>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET api_key = $1, updated_at = NOW() WHERE id = $2")
            .bind(api_key)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let token = Uuid::new_v4();
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    async fn find_session(&self, token: Uuid) -> Result<Option<SessionRow>, StoreError> {
        Ok(sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.user_id, u.username, s.expires_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_search(&self, search: NewSearch<'_>) -> Result<i64, StoreError> {
        let query_data = serde_json::to_string(search.query_data)?;
        let recommendations = serde_json::to_string(search.recommendations)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO searches (user_id, query_data, recommendations, search_title)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(search.user_id)
        .bind(query_data)
        .bind(recommendations)
        .bind(search.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_searches(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<SearchRecord>, StoreError> {
        let rows = sqlx::query_as::<_, SearchRow>(
            r#"
            SELECT * FROM searches
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.decode().map_err(StoreError::from))
            .collect()
    }

    async fn get_search(
        &self,
        search_id: i64,
        user_id: i64,
    ) -> Result<Option<SearchRecord>, StoreError> {
        let row = sqlx::query_as::<_, SearchRow>(
            "SELECT * FROM searches WHERE id = $1 AND user_id = $2",
        )
        .bind(search_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SearchRow::decode).transpose()?)
    }

    async fn search_timestamps(&self, user_id: i64) -> Result<Vec<DateTime<Utc>>, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT created_at FROM searches WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn record_search_usage(&self, user_id: i64) -> Result<(), StoreError> {
        // Single-statement increment: concurrent searches serialize on the row lock.
        sqlx::query(
            r#"
            UPDATE user_stats
            SET total_searches = total_searches + 1,
                total_api_calls = total_api_calls + 1,
                last_search_date = NOW(),
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_stats(&self, user_id: i64) -> Result<UsageStats, StoreError> {
        let stats = sqlx::query_as::<_, UsageStats>(
            r#"
            SELECT total_searches, total_api_calls, last_search_date
            FROM user_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats.unwrap_or_default())
    }
}
