// src/routes/invoice_routes.rs

use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiQuery},
    middleware::auth_context::AuthContext,
    models::{AppState, CreateInvoiceRequest, InvoiceFilter, InvoiceRow, UpdateInvoiceStatusRequest},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoices", post(create_invoice).get(list_invoices))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}/status", patch(update_invoice_status))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreateInvoiceRequest>,
) -> Result<Json<InvoiceRow>, ApiError> {
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err(ApiError::validation("amount must be a non-negative number"));
    }
    if req.due_date.is_some_and(|due| due < req.issue_date) {
        return Err(ApiError::validation("dueDate must not be before issueDate"));
    }

    if state.repo.get_patient(req.patient_id).await?.is_none() {
        return Err(ApiError::not_found("patient"));
    }
    if let Some(procedure_id) = req.procedure_id {
        if state.repo.get_procedure(procedure_id).await?.is_none() {
            return Err(ApiError::not_found("procedure"));
        }
    }

    Ok(Json(state.repo.create_invoice(&req).await?))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(filter): ApiQuery<InvoiceFilter>,
) -> Result<Json<Vec<InvoiceRow>>, ApiError> {
    Ok(Json(state.repo.list_invoices(filter.status).await?))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> Result<Json<InvoiceRow>, ApiError> {
    state
        .repo
        .get_invoice(invoice_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("invoice"))
}

pub async fn update_invoice_status(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(invoice_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateInvoiceStatusRequest>,
) -> Result<Json<InvoiceRow>, ApiError> {
    state
        .repo
        .update_invoice_status(invoice_id, req.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("invoice"))
}
