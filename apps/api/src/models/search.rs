use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

/// A `searches` row as stored: both payload columns are serialized JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub user_id: i64,
    pub query_data: String,
    pub recommendations: String,
    pub search_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SearchRow {
    /// Deserializes both payload columns. Called on every read.
    pub fn decode(self) -> Result<SearchRecord, serde_json::Error> {
        Ok(SearchRecord {
            id: self.id,
            user_id: self.user_id,
            query_data: serde_json::from_str(&self.query_data)?,
            recommendations: serde_json::from_str(&self.recommendations)?,
            title: self.search_title,
            created_at: self.created_at,
        })
    }
}

/// A decoded search. Handlers project it into their own response types.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    pub id: i64,
    pub user_id: i64,
    pub query_data: Value,
    pub recommendations: Value,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a search record.
#[derive(Debug)]
pub struct NewSearch<'a> {
    pub user_id: i64,
    pub query_data: &'a Value,
    pub recommendations: &'a Value,
    pub title: &'a str,
}
