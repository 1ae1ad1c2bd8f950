// src/routes/achievement_routes.rs

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    achievements::{self, AwardOutcome},
    error::{ApiError, ApiJson, ApiPath},
    middleware::auth_context::AuthContext,
    models::{
        AchievementRow, AppState, CreateAchievementRequest, EarnedAchievementRow,
        UserAchievementRow,
    },
};

#[derive(Debug, Serialize)]
pub struct AwardResponse {
    pub awarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub award: Option<UserAchievementRow>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/achievements", post(create_achievement).get(list_achievements))
        .route("/achievements/user", get(list_earned))
        .route("/achievements/{achievement_id}/award", post(award))
}

pub async fn create_achievement(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateAchievementRequest>,
) -> Result<Json<AchievementRow>, ApiError> {
    auth.ensure_admin()?;
    if req.name.trim().is_empty() || req.achievement_type.trim().is_empty() {
        return Err(ApiError::validation("name and achievementType are required"));
    }
    if req.point_value < 0 {
        return Err(ApiError::validation("pointValue must not be negative"));
    }
    Ok(Json(state.repo.create_achievement(&req).await?))
}

pub async fn list_achievements(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<AchievementRow>>, ApiError> {
    Ok(Json(state.repo.list_achievements().await?))
}

pub async fn list_earned(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<EarnedAchievementRow>>, ApiError> {
    Ok(Json(state.repo.list_earned_achievements().await?))
}

/// `awarded` is false when the achievement had already been earned.
pub async fn award(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(achievement_id): ApiPath<Uuid>,
) -> Result<Json<AwardResponse>, ApiError> {
    match achievements::award_achievement(state.repo.as_ref(), achievement_id, Utc::now()).await? {
        AwardOutcome::Awarded(row) => Ok(Json(AwardResponse {
            awarded: true,
            award: Some(row),
        })),
        AwardOutcome::AlreadyAwarded => Ok(Json(AwardResponse {
            awarded: false,
            award: None,
        })),
        AwardOutcome::UnknownAchievement => Err(ApiError::not_found("achievement")),
    }
}
