//! Axum route handlers for `/api/search`.

use axum::{
    extract::{Path, Query as QueryParams, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::errors::{AppError, AppJson};
use crate::llm_client::LlmError;
use crate::models::search::NewSearch;
use crate::recommend::client::{get_recommendations, RecommendationResult};
use crate::recommend::history::{parse_limit, resolve_title, SearchSummary};
use crate::recommend::normalize::normalize;
use crate::recommend::prompts::build_prompt;
use crate::recommend::query::Query;
use crate::state::AppState;

const MISSING_KEY_MESSAGE: &str =
    "Gemini API key is required. Please provide it or set it in your profile.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub query_data: Value,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub success: bool,
    pub recommendations: RecommendationResult,
    /// Set when the result was saved to the caller's history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<i64>,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub query_data: Value,
    #[serde(default)]
    pub recommendations: Value,
    #[serde(default)]
    pub search_title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub search_id: i64,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub searches: Vec<SearchSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDetail {
    pub id: i64,
    pub title: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub query_data: Value,
    /// Exactly as stored.
    pub recommendations: Value,
    /// Flattened view of `recommendations`; `null` when there is nothing to show.
    pub normalized: Option<RecommendationResult>,
}

#[derive(Debug, Serialize)]
pub struct SearchDetailResponse {
    pub success: bool,
    pub search: SearchDetail,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/search/recommend
///
/// Builds the prompt, calls the provider with the request's key or the stored
/// one, saves non-empty results to history and bumps usage stats.
pub async fn handle_recommend(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(req): AppJson<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    if !req.query_data.is_object() {
        return Err(AppError::field("queryData", "Query data is required"));
    }
    let query: Query = serde_json::from_value(req.query_data.clone())
        .map_err(|e| AppError::field("queryData", format!("Invalid query data: {e}")))?;
    query.validate().map_err(AppError::Validation)?;

    let api_key = resolve_api_key(&state, &auth, req.api_key.as_deref()).await?;

    let prompt = build_prompt(&query);
    let result = match get_recommendations(state.generator.as_ref(), &prompt, &api_key).await {
        Ok(result) => result,
        Err(LlmError::MalformedResponse) => {
            warn!(
                "Provider envelope had no candidate text for user {}; returning degraded result",
                auth.user_id
            );
            RecommendationResult::degraded()
        }
        Err(LlmError::MissingApiKey) => {
            return Err(AppError::MissingCredential(MISSING_KEY_MESSAGE.into()))
        }
        Err(e) => return Err(AppError::Upstream(e.to_string())),
    };

    let search_id = if result.is_empty() {
        None
    } else {
        let recommendations = serde_json::to_value(&result)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serializing result: {e}")))?;
        let title = resolve_title(None, &req.query_data);
        let id = state
            .store
            .create_search(NewSearch {
                user_id: auth.user_id,
                query_data: &req.query_data,
                recommendations: &recommendations,
                title: &title,
            })
            .await?;
        Some(id)
    };

    // Stats are telemetry: a failure here must not lose the generated result.
    if let Err(e) = state.store.record_search_usage(auth.user_id).await {
        warn!("Failed to update usage stats for user {}: {e}", auth.user_id);
    }

    info!(
        "Generated {} recommendations for user {}",
        result.recommendations.len(),
        auth.user_id
    );

    Ok(Json(RecommendResponse {
        success: true,
        recommendations: result,
        search_id,
        message: "Recommendations generated successfully",
    }))
}

/// POST /api/search/save
pub async fn handle_save(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(req): AppJson<SaveRequest>,
) -> Result<(StatusCode, Json<SaveResponse>), AppError> {
    let mut errors = Vec::new();
    if !req.query_data.is_object() {
        errors.push(crate::errors::FieldError::new(
            "queryData",
            "Query data must be an object",
        ));
    }
    if !req.recommendations.is_object() {
        errors.push(crate::errors::FieldError::new(
            "recommendations",
            "Recommendations must be an object",
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let title = resolve_title(req.search_title.as_deref(), &req.query_data);
    let search_id = state
        .store
        .create_search(NewSearch {
            user_id: auth.user_id,
            query_data: &req.query_data,
            recommendations: &req.recommendations,
            title: &title,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveResponse {
            success: true,
            search_id,
            message: "Search saved successfully",
        }),
    ))
}

/// GET /api/search/history?limit=N
pub async fn handle_history(
    State(state): State<AppState>,
    auth: AuthContext,
    QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = parse_limit(params.limit.as_deref());
    let records = state.store.list_searches(auth.user_id, limit).await?;

    Ok(Json(HistoryResponse {
        success: true,
        searches: records.iter().map(SearchSummary::from).collect(),
    }))
}

/// GET /api/search/:id
///
/// Records owned by someone else are reported as missing.
pub async fn handle_get_search(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(raw_id): Path<String>,
) -> Result<Json<SearchDetailResponse>, AppError> {
    let search_id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid search ID".into()))?;

    let record = state
        .store
        .get_search(search_id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Search not found".into()))?;

    let normalized = normalize(&record.recommendations);

    Ok(Json(SearchDetailResponse {
        success: true,
        search: SearchDetail {
            id: record.id,
            title: record.title,
            created_at: record.created_at,
            query_data: record.query_data,
            recommendations: record.recommendations,
            normalized,
        },
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Request key first, then the key stored on the profile.
async fn resolve_api_key(
    state: &AppState,
    auth: &AuthContext,
    requested: Option<&str>,
) -> Result<String, AppError> {
    if let Some(key) = requested.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    let stored = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .and_then(|user| user.api_key)
        .filter(|k| !k.trim().is_empty());

    stored.ok_or_else(|| AppError::MissingCredential(MISSING_KEY_MESSAGE.into()))
}
