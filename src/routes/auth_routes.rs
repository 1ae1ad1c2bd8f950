use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{Duration, Utc};

use crate::{
    auth::{generate_access_token, hash_access_token, verify_password},
    error::{ApiError, ApiJson},
    middleware::auth_context::AuthContext,
    models::*,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("username and password are required"));
    }

    let user = state
        .repo
        .find_user_by_username(username)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !user.is_active {
        return Err(ApiError::Forbidden("FORBIDDEN", "Account is disabled".into()));
    }
    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    let access_token = generate_access_token();
    let expires_at = Duration::try_hours(state.session_ttl_hours)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| ApiError::Internal("Session lifetime is out of range".into()))?;
    let session = state
        .repo
        .create_session(user.user_id, &hash_access_token(&access_token), expires_at)
        .await?;

    tracing::info!(username = %user.username, "login");

    Ok(Json(LoginResponse {
        access_token,
        expires_at: session.expires_at,
        user: UserProfile {
            user_id: user.user_id,
            username: user.username,
            display_name: user.display_name,
            is_admin: user.is_admin,
        },
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<OkResponse>, ApiError> {
    state
        .repo
        .revoke_session(auth.session_token_id, Utc::now())
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

pub async fn me(auth: AuthContext) -> Json<UserProfile> {
    Json(UserProfile {
        user_id: auth.user_id,
        username: auth.username,
        display_name: auth.display_name,
        is_admin: auth.is_admin,
    })
}
