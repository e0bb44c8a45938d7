//! Authentication routes.
//!
//! JSON API endpoints for registration, login, token refresh, and logout.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use bazaar_core::UserRole;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::auth::TokenPair;
use crate::state::AppState;

/// Request to register a new account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Buyer by default; sellers opt in at registration.
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Response from registering: the created user.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

/// Register a new account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// Returns 400 for invalid email or weak password, 409 if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let role = match req.role.unwrap_or(UserRole::Buyer) {
        UserRole::Admin => {
            // Admins are provisioned from the CLI, never self-service
            return Err(AppError::Forbidden("cannot self-register as admin".into()));
        }
        role => role,
    };

    let user = state
        .auth()
        .register(&req.email, &req.password, &req.display_name, role)
        .await?;

    Ok(Json(RegisterResponse { user }))
}

/// Request to login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from login or refresh: the user and a fresh token pair.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Login with email and password.
///
/// POST /api/auth/login
///
/// # Errors
///
/// Returns 401 for wrong credentials, 403 if the account is banned.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let (user, tokens) = state.auth().login(&req.email, &req.password).await?;

    Ok(Json(SessionResponse { user, tokens }))
}

/// Request carrying a refresh token.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Rotate a refresh token into a new token pair.
///
/// POST /api/auth/refresh
///
/// # Errors
///
/// Returns 401 if the token is unknown, revoked, or expired, and 403 if the
/// account was banned since the token was issued.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<SessionResponse>> {
    let (user, tokens) = state.auth().refresh(&req.refresh_token).await?;

    Ok(Json(SessionResponse { user, tokens }))
}

/// Revoke the refresh token and its whole family.
///
/// POST /api/auth/logout
///
/// Idempotent: logging out an unknown token succeeds.
///
/// # Errors
///
/// Returns 500 if the revocation cannot be persisted.
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>> {
    state.auth().logout(&req.refresh_token).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}
