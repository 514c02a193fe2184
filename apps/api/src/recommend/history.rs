//! Titles and list summaries for saved searches.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::models::search::SearchRecord;
use crate::recommend::normalize::recommendation_count;

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 1000;

const TITLE_CHARS: usize = 50;
const HISTORY_PREVIEW_CHARS: usize = 100;
const RECENT_PREVIEW_CHARS: usize = 60;

/// First `max_chars` characters followed by `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

fn use_case_of(query_data: &Value) -> &str {
    query_data
        .get("useCase")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
}

/// Title used when the caller does not supply one.
pub fn default_title(query_data: &Value) -> String {
    match use_case_of(query_data) {
        "" => "Untitled Search".to_string(),
        use_case => format!("Search: {}", preview(use_case, TITLE_CHARS)),
    }
}

/// Picks the caller's title when it has text, the generated one otherwise.
pub fn resolve_title(requested: Option<&str>, query_data: &Value) -> String {
    match requested.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => default_title(query_data),
    }
}

/// `?limit=` parsing: missing, non-numeric or non-positive values give the default.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map_or(DEFAULT_HISTORY_LIMIT, |n| n.min(MAX_HISTORY_LIMIT))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub id: i64,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub use_case: String,
    pub recommendation_count: usize,
}

impl From<&SearchRecord> for SearchSummary {
    fn from(record: &SearchRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            created_at: record.created_at,
            use_case: preview(use_case_of(&record.query_data), HISTORY_PREVIEW_CHARS),
            recommendation_count: recommendation_count(&record.recommendations),
        }
    }
}

/// Shorter entry used on the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub id: i64,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub use_case: String,
}

impl From<&SearchRecord> for RecentSearch {
    fn from(record: &SearchRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            created_at: record.created_at,
            use_case: preview(use_case_of(&record.query_data), RECENT_PREVIEW_CHARS),
        }
    }
}
