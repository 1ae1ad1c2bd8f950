// src/routes/patient_routes.rs

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiQuery},
    middleware::auth_context::AuthContext,
    models::{AppState, CreatePatientRequest, PatientRow, UpdatePatientRequest},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", post(create_patient).get(search_patients))
        .route("/patients/{patient_id}", get(get_patient).patch(update_patient))
}

fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub async fn create_patient(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreatePatientRequest>,
) -> Result<Json<PatientRow>, ApiError> {
    validate_name("firstName", &req.first_name)?;
    validate_name("lastName", &req.last_name)?;

    let row = state.repo.create_patient(&req).await?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub async fn search_patients(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(q): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<PatientRow>>, ApiError> {
    let search = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = state.repo.list_patients(search).await?;
    Ok(Json(rows))
}

pub async fn get_patient(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(patient_id): ApiPath<Uuid>,
) -> Result<Json<PatientRow>, ApiError> {
    let row = state
        .repo
        .get_patient(patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("patient"))?;
    Ok(Json(row))
}

pub async fn update_patient(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(patient_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdatePatientRequest>,
) -> Result<Json<PatientRow>, ApiError> {
    if let Some(first) = req.first_name.as_deref() {
        validate_name("firstName", first)?;
    }
    if let Some(last) = req.last_name.as_deref() {
        validate_name("lastName", last)?;
    }

    let row = state
        .repo
        .update_patient(patient_id, &req)
        .await?
        .ok_or_else(|| ApiError::not_found("patient"))?;
    Ok(Json(row))
}
