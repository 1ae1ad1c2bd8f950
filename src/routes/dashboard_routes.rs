// src/routes/dashboard_routes.rs

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::{
    dashboard::{self, DashboardStats},
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(stats))
}

pub async fn stats(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(dashboard::collect_stats(state.repo.as_ref(), Utc::now()).await?))
}
