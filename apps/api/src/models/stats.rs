use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_searches: i64,
    pub total_api_calls: i64,
    pub last_search_date: Option<DateTime<Utc>>,
}
