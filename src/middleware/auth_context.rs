use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::auth::hash_access_token;
use crate::error::ApiError;
use crate::models::AppState;

/// The authenticated principal, handed to every protected handler.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub session_token_id: Uuid,
}

impl AuthContext {
    pub fn ensure_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::admin_only())
        }
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            // Authorization: Bearer <token>
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::session_expired())?;

            let token_hash = hash_access_token(authz.token());
            let now = Utc::now();

            let row = state
                .repo
                .find_active_session(&token_hash, now)
                .await?
                .ok_or_else(ApiError::session_expired)?;

            // best-effort
            if let Err(e) = state.repo.touch_session(row.session_token_id, now).await {
                tracing::debug!(error = %e, "could not update session last_seen_at");
            }

            Ok(AuthContext {
                user_id: row.user_id,
                username: row.username,
                display_name: row.display_name,
                is_admin: row.is_admin,
                session_token_id: row.session_token_id,
            })
        }
    }
}
