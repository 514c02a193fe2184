pub mod health;


use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::recommend::handlers as search;
use crate::state::AppState;
use crate::user::handlers as user;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/logout", post(auth::handle_logout))
        .route("/api/auth/status", get(auth::handle_status))
        .route("/api/auth/profile", get(auth::handle_profile))
        // User API
        .route("/api/user/profile", get(user::handle_profile))
        .route(
            "/api/user/api-key",
            put(user::handle_set_api_key).delete(user::handle_delete_api_key),
        )
        .route("/api/user/stats", get(user::handle_stats))
        // Search API
        .route("/api/search/recommend", post(search::handle_recommend))
        .route("/api/search/save", post(search::handle_save))
        .route("/api/search/history", get(search::handle_history))
        .route("/api/search/:id", get(search::handle_get_search))
        .with_state(state)
}
