//! In-memory `Store` used by the unit and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::search::{NewSearch, SearchRecord, SearchRow};
use crate::models::session::SessionRow;
use crate::models::stats::UsageStats;
use crate::models::user::UserRow;
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Inner {
    users: Vec<UserRow>,
    sessions: HashMap<Uuid, (i64, DateTime<Utc>)>,
    searches: Vec<SearchRow>,
    stats: HashMap<i64, UsageStats>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user and everything that references it.
    pub fn delete_user(&self, user_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.users.retain(|u| u.id != user_id);
        inner.sessions.retain(|_, (owner, _)| *owner != user_id);
        inner.searches.retain(|s| s.user_id != user_id);
        inner.stats.remove(&user_id);
    }

    /// Backdates a search, for exercising time-window statistics.
    pub fn set_search_created_at(&self, search_id: i64, created_at: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(row) = inner.searches.iter_mut().find(|s| s.id == search_id) {
            row.created_at = created_at;
        }
    }

    pub fn search_count(&self) -> usize {
        self.inner.lock().unwrap().searches.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserRow, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.username == username) {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }
        let now = Utc::now();
        let user = UserRow {
            id: inner.users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            api_key: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        inner.stats.insert(user.id, UsageStats::default());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn set_api_key(&self, user_id: i64, api_key: Option<&str>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.api_key = api_key.map(str::to_string);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let token = Uuid::new_v4();
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(token, (user_id, expires_at));
        Ok(token)
    }

    async fn find_session(&self, token: Uuid) -> Result<Option<SessionRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let Some(&(user_id, expires_at)) = inner.sessions.get(&token) else {
            return Ok(None);
        };
        Ok(inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| SessionRow {
                user_id,
                username: u.username.clone(),
                expires_at,
            }))
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), StoreError> {
        self.inner.lock().unwrap().sessions.remove(&token);
        Ok(())
    }

    async fn create_search(&self, search: NewSearch<'_>) -> Result<i64, StoreError> {
        let query_data = serde_json::to_string(search.query_data)?;
        let recommendations = serde_json::to_string(search.recommendations)?;

        let mut inner = self.inner.lock().unwrap();
        let id = inner.searches.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        inner.searches.push(SearchRow {
            id,
            user_id: search.user_id,
            query_data,
            recommendations,
            search_title: Some(search.title.to_string()),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_searches(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<SearchRecord>, StoreError> {
        let mut rows: Vec<SearchRow> = {
            let inner = self.inner.lock().unwrap();
            inner
                .searches
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(0));

        rows.into_iter()
            .map(|row| row.decode().map_err(StoreError::from))
            .collect()
    }

    async fn get_search(
        &self,
        search_id: i64,
        user_id: i64,
    ) -> Result<Option<SearchRecord>, StoreError> {
        let row = {
            let inner = self.inner.lock().unwrap();
            inner
                .searches
                .iter()
                .find(|s| s.id == search_id && s.user_id == user_id)
                .cloned()
        };
        Ok(row.map(SearchRow::decode).transpose()?)
    }

    async fn search_timestamps(&self, user_id: i64) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .searches
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.created_at)
            .collect())
    }

    async fn record_search_usage(&self, user_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(stats) = inner.stats.get_mut(&user_id) {
            stats.total_searches += 1;
            stats.total_api_calls += 1;
            stats.last_search_date = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_stats(&self, user_id: i64) -> Result<UsageStats, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.stats.get(&user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_duplicate_username_is_rejected_and_first_user_kept() {
        let store = MemoryStore::new();
        let first = store.create_user("alice", "hash-1").await.unwrap();

        let err = store.create_user("alice", "hash-2").await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(ref name) if name == "alice"));

        let kept = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(kept.id, first.id);
        assert_eq!(kept.password_hash, "hash-1");
    }

    #[tokio::test]
    async fn test_stats_row_created_with_user() {
        let store = MemoryStore::new();
        let user = store.create_user("bob", "hash").await.unwrap();
        assert_eq!(store.get_stats(user.id).await.unwrap(), UsageStats::default());
    }

    #[tokio::test]
    async fn test_concurrent_usage_increments_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let user = store.create_user("carol", "hash").await.unwrap();

        let a = tokio::spawn({
            let store = store.clone();
            async move { store.record_search_usage(user.id).await }
        });
        let b = tokio::spawn({
            let store = store.clone();
            async move { store.record_search_usage(user.id).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let stats = store.get_stats(user.id).await.unwrap();
        assert_eq!(stats.total_searches, 2);
        assert_eq!(stats.total_api_calls, 2);
        assert!(stats.last_search_date.is_some());
    }

    #[tokio::test]
    async fn test_session_lookup_and_delete() {
        let store = MemoryStore::new();
        let user = store.create_user("erin", "hash").await.unwrap();
        let expires_at = Utc::now() + chrono::Duration::hours(1);
        let token = store.create_session(user.id, expires_at).await.unwrap();

        let session = store.find_session(token).await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.username, "erin");
        assert!(!session.is_expired(Utc::now()));

        store.delete_session(token).await.unwrap();
        assert!(store.find_session(token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_search_requires_owner() {
        let store = MemoryStore::new();
        let owner = store.create_user("owner", "hash").await.unwrap();
        let other = store.create_user("other", "hash").await.unwrap();

        let query = json!({"useCase": "note taking"});
        let recs = json!({"recommendations": [], "summary": "s", "additionalNotes": "n"});
        let id = store
            .create_search(NewSearch {
                user_id: owner.id,
                query_data: &query,
                recommendations: &recs,
                title: "Search: note taking...",
            })
            .await
            .unwrap();

        assert!(store.get_search(id, owner.id).await.unwrap().is_some());
        assert!(store.get_search(id, other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_searches() {
        let store = MemoryStore::new();
        let user = store.create_user("dave", "hash").await.unwrap();
        let payload = json!({});
        store
            .create_search(NewSearch {
                user_id: user.id,
                query_data: &payload,
                recommendations: &payload,
                title: "t",
            })
            .await
            .unwrap();

        store.delete_user(user.id);

        assert_eq!(store.search_count(), 0);
        assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
    }
}
