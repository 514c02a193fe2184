//! Handlers for `/api/auth` (register, login, logout, status, profile).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{clear_session_cookie, session_cookie, AuthContext};
use crate::auth::validation::{validate_login, validate_registration};
use crate::errors::{AppError, AppJson};
use crate::models::user::UserProfile;
use crate::state::AppState;
use crate::store::StoreError;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub has_api_key: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user: SessionUser,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: LoginUser,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

type WithCookie<T> = (StatusCode, [(axum::http::HeaderName, String); 1], Json<T>);

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Creates the account and signs the new user in.
pub async fn handle_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<WithCookie<RegisterResponse>, AppError> {
    validate_registration(&req.username, &req.password).map_err(AppError::Validation)?;

    if state
        .store
        .find_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing error: {e}")))?;

    // The pre-check above races with concurrent registrations; the unique
    // constraint is the real guard.
    let user = match state.store.create_user(&req.username, &password_hash).await {
        Ok(user) => user,
        Err(StoreError::UsernameTaken(_)) => {
            return Err(AppError::Conflict("Username already exists".into()))
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = open_session(&state, user.id).await?;
    info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(RegisterResponse {
            success: true,
            user: SessionUser {
                id: user.id,
                username: user.username,
            },
            message: "User registered successfully",
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<WithCookie<LoginResponse>, AppError> {
    validate_login(&req.username, &req.password).map_err(AppError::Validation)?;

    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let user = state
        .store
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let cookie = open_session(&state, user.id).await?;

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            user: LoginUser {
                id: user.id,
                has_api_key: user.has_api_key(),
                username: user.username,
            },
            message: "Login successful",
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds; drops the server-side session when a live one is presented.
pub async fn handle_logout(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
) -> Result<WithCookie<MessageResponse>, AppError> {
    if let Some(auth) = auth {
        state.store.delete_session(auth.session).await?;
        info!("User {} logged out", auth.user_id);
    }

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully",
        }),
    ))
}

/// GET /api/auth/status
pub async fn handle_status(auth: Option<AuthContext>) -> Json<StatusResponse> {
    Json(match auth {
        Some(auth) => StatusResponse {
            authenticated: true,
            user: Some(SessionUser {
                id: auth.user_id,
                username: auth.username,
            }),
        },
        None => StatusResponse {
            authenticated: false,
            user: None,
        },
    })
}

/// GET /api/auth/profile
pub async fn handle_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<UserProfile>, AppError> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserProfile::from(&user)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn open_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let ttl = state.config.session_ttl_hours;
    let token = state
        .store
        .create_session(user_id, Utc::now() + Duration::hours(ttl))
        .await?;
    Ok(session_cookie(token, ttl, state.config.cookie_secure))
}
