//! Handlers for `/api/user`.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::validation::validate_api_key;
use crate::auth::AuthContext;
use crate::errors::{AppError, AppJson};
use crate::models::user::{UserProfile, UserRow};
use crate::recommend::history::RecentSearch;
use crate::state::AppState;
use crate::user::activity::activity_counts;

const RECENT_SEARCHES: i64 = 5;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_searches: i64,
    pub total_api_calls: i64,
    pub last_search_date: Option<DateTime<Utc>>,
    pub member_since: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
    pub stats: ProfileStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRequest {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_searches: i64,
    pub total_api_calls: i64,
    pub searches_this_week: usize,
    pub searches_this_month: usize,
    pub last_search_date: Option<DateTime<Utc>>,
    pub recent_searches: Vec<RecentSearch>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/user/profile
pub async fn handle_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = current_user(&state, &auth).await?;
    let stats = state.store.get_stats(auth.user_id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        stats: ProfileStats {
            total_searches: stats.total_searches,
            total_api_calls: stats.total_api_calls,
            last_search_date: stats.last_search_date,
            member_since: user.created_at,
        },
        user: UserProfile::from(&user),
    }))
}

/// PUT /api/user/api-key
pub async fn handle_set_api_key(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(req): AppJson<ApiKeyRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let api_key = req.api_key.trim();
    validate_api_key(api_key).map_err(AppError::Validation)?;

    state.store.set_api_key(auth.user_id, Some(api_key)).await?;
    info!("User {} stored an API key", auth.user_id);

    Ok(Json(MessageResponse {
        success: true,
        message: "API key updated successfully",
    }))
}

/// DELETE /api/user/api-key
pub async fn handle_delete_api_key(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.set_api_key(auth.user_id, None).await?;
    info!("User {} removed their API key", auth.user_id);

    Ok(Json(MessageResponse {
        success: true,
        message: "API key removed successfully",
    }))
}

/// GET /api/user/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.store.get_stats(auth.user_id).await?;
    let timestamps = state.store.search_timestamps(auth.user_id).await?;
    let activity = activity_counts(&timestamps, Utc::now());
    let recent = state
        .store
        .list_searches(auth.user_id, RECENT_SEARCHES)
        .await?;

    Ok(Json(StatsResponse {
        success: true,
        stats: DashboardStats {
            total_searches: stats.total_searches,
            total_api_calls: stats.total_api_calls,
            searches_this_week: activity.this_week,
            searches_this_month: activity.this_month,
            last_search_date: stats.last_search_date,
            recent_searches: recent.iter().map(RecentSearch::from).collect(),
        },
    }))
}

async fn current_user(state: &AppState, auth: &AuthContext) -> Result<UserRow, AppError> {
    state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
