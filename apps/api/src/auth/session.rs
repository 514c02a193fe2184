//! Session-cookie authentication extractor for Axum handlers.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "toolfinder_session";

/// Identity of the caller, resolved from the session cookie.
///
/// Use as an extractor parameter in any handler that requires authentication;
/// requests without a live session are rejected with 401 before the handler
/// runs. `Option<AuthContext>` gives the non-rejecting variant.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub session: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

        let session = state
            .store
            .find_session(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

        if session.is_expired(Utc::now()) {
            debug!("Session for user {} expired", session.user_id);
            state.store.delete_session(token).await?;
            return Err(AppError::Unauthorized("Session expired".into()));
        }

        Ok(AuthContext {
            user_id: session.user_id,
            username: session.username,
            session: token,
        })
    }
}

/// Reads the session token from the `Cookie` header(s), if well formed.
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value that opens a session.
pub fn session_cookie(token: Uuid, ttl_hours: i64, secure: bool) -> String {
    let max_age = Duration::hours(ttl_hours).num_seconds();
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie from the browser.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
