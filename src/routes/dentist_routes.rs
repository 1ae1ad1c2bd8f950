// src/routes/dentist_routes.rs
//
// Referring dentists/clinics (external practitioners, not staff accounts).

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath},
    middleware::auth_context::AuthContext,
    models::{AppState, CreateDentistRequest, DentistRow, UpdateDentistRequest},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dentists", post(create_dentist).get(list_dentists))
        .route("/dentists/{dentist_id}", get(get_dentist).patch(update_dentist))
}

pub async fn create_dentist(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreateDentistRequest>,
) -> Result<Json<DentistRow>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    Ok(Json(state.repo.create_dentist(&req).await?))
}

pub async fn list_dentists(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<DentistRow>>, ApiError> {
    Ok(Json(state.repo.list_dentists().await?))
}

pub async fn get_dentist(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(dentist_id): ApiPath<Uuid>,
) -> Result<Json<DentistRow>, ApiError> {
    state
        .repo
        .get_dentist(dentist_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("dentist"))
}

pub async fn update_dentist(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(dentist_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateDentistRequest>,
) -> Result<Json<DentistRow>, ApiError> {
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("name must not be empty"));
    }
    state
        .repo
        .update_dentist(dentist_id, &req)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("dentist"))
}
