// src/routes/procedure_routes.rs

use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiQuery},
    middleware::auth_context::AuthContext,
    models::{
        AppState, CreateProcedureRequest, ProcedureFilter, ProcedureRow,
        UpdatePaymentStatusRequest,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/procedures", post(create_procedure).get(list_procedures))
        .route("/procedures/{procedure_id}", get(get_procedure))
        .route(
            "/procedures/{procedure_id}/payment-status",
            patch(update_payment_status),
        )
}

pub async fn create_procedure(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreateProcedureRequest>,
) -> Result<Json<ProcedureRow>, ApiError> {
    if req.procedure_type.trim().is_empty() {
        return Err(ApiError::validation("procedureType is required"));
    }
    if !req.value.is_finite() || req.value < 0.0 {
        return Err(ApiError::validation("value must be a non-negative number"));
    }

    if state.repo.get_patient(req.patient_id).await?.is_none() {
        return Err(ApiError::not_found("patient"));
    }
    if let Some(dentist_id) = req.dentist_id {
        if state.repo.get_dentist(dentist_id).await?.is_none() {
            return Err(ApiError::not_found("dentist"));
        }
    }

    Ok(Json(state.repo.create_procedure(&req).await?))
}

pub async fn list_procedures(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(filter): ApiQuery<ProcedureFilter>,
) -> Result<Json<Vec<ProcedureRow>>, ApiError> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if to < from {
            return Err(ApiError::validation("to must not be before from"));
        }
    }
    Ok(Json(state.repo.list_procedures(&filter).await?))
}

pub async fn get_procedure(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(procedure_id): ApiPath<Uuid>,
) -> Result<Json<ProcedureRow>, ApiError> {
    state
        .repo
        .get_procedure(procedure_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("procedure"))
}

pub async fn update_payment_status(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(procedure_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdatePaymentStatusRequest>,
) -> Result<Json<ProcedureRow>, ApiError> {
    state
        .repo
        .update_payment_status(procedure_id, req.payment_status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("procedure"))
}
