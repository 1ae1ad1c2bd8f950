// src/routes/goal_routes.rs

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath},
    goals::{self, GoalError, ProgressReport},
    middleware::auth_context::AuthContext,
    models::{
        AppState, CreateGoalRequest, FinancialGoalRow, GoalProgressRequest, OkResponse,
        UpdateGoalRequest,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/financial-goals", post(create_goal).get(list_goals))
        .route("/financial-goals/active", get(list_active_goals))
        .route("/financial-goals/check-progress", post(check_progress))
        .route(
            "/financial-goals/{goal_id}",
            get(get_goal).patch(update_goal).delete(delete_goal),
        )
        .route("/financial-goals/{goal_id}/progress", post(update_progress))
}

fn validate_goal(name: &str, target_value: f64, start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    if !target_value.is_finite() || target_value <= 0.0 {
        return Err(ApiError::validation("targetValue must be greater than zero"));
    }
    if end < start {
        return Err(GoalError::InvalidWindow { start, end }.into());
    }
    Ok(())
}

/* ============================================================
   POST /financial-goals (admin)
   ============================================================ */

pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateGoalRequest>,
) -> Result<Json<FinancialGoalRow>, ApiError> {
    auth.ensure_admin()?;
    validate_goal(&req.name, req.target_value, req.start_date, req.end_date)?;

    let goal = state.repo.create_goal(&req).await?;
    tracing::info!(goal_id = %goal.goal_id, goal_type = %goal.goal_type, "goal created");
    Ok(Json(goal))
}

pub async fn list_goals(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<FinancialGoalRow>>, ApiError> {
    Ok(Json(state.repo.list_goals().await?))
}

pub async fn list_active_goals(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<FinancialGoalRow>>, ApiError> {
    Ok(Json(state.repo.list_active_goals().await?))
}

/* ============================================================
   POST /financial-goals/check-progress
   ============================================================ */

pub async fn check_progress(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ProgressReport>, ApiError> {
    let report = goals::check_goals_progress(state.repo.as_ref(), Utc::now()).await?;
    Ok(Json(report))
}

pub async fn get_goal(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(goal_id): ApiPath<Uuid>,
) -> Result<Json<FinancialGoalRow>, ApiError> {
    state
        .repo
        .get_goal(goal_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("goal"))
}

/* ============================================================
   PATCH /financial-goals/{goal_id} (admin)
   ============================================================ */

pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(goal_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateGoalRequest>,
) -> Result<Json<FinancialGoalRow>, ApiError> {
    auth.ensure_admin()?;

    let current = state
        .repo
        .get_goal(goal_id)
        .await?
        .ok_or_else(|| ApiError::not_found("goal"))?;

    validate_goal(
        req.name.as_deref().unwrap_or(&current.name),
        req.target_value.unwrap_or(current.target_value),
        req.start_date.unwrap_or(current.start_date),
        req.end_date.unwrap_or(current.end_date),
    )?;

    state
        .repo
        .update_goal(goal_id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("goal"))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(goal_id): ApiPath<Uuid>,
) -> Result<Json<OkResponse>, ApiError> {
    auth.ensure_admin()?;
    if !state.repo.delete_goal(goal_id).await? {
        return Err(ApiError::not_found("goal"));
    }
    tracing::info!(%goal_id, "goal deleted");
    Ok(Json(OkResponse { ok: true }))
}

/* ============================================================
   POST /financial-goals/{goal_id}/progress
   ============================================================ */

pub async fn update_progress(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(goal_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<GoalProgressRequest>,
) -> Result<Json<FinancialGoalRow>, ApiError> {
    if !req.value.is_finite() || req.value < 0.0 {
        return Err(ApiError::validation("value must be a non-negative number"));
    }
    let goal = goals::update_goal_progress(state.repo.as_ref(), goal_id, req.value, Utc::now()).await?;
    Ok(Json(goal))
}
