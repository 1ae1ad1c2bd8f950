// src/routes/material_routes.rs

use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiJson, ApiPath, ApiQuery},
    inventory::{self, ProcedureCost},
    middleware::auth_context::AuthContext,
    models::{
        AppState, CreateMaterialRequest, CreateProcedureMaterialRequest, MaterialRow,
        ProcedureMaterialFilter, ProcedureMaterialRow, UpdateStockRequest,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/materials", post(create_material).get(list_materials))
        .route("/materials/low-stock", get(low_stock_materials))
        .route("/materials/{material_id}", get(get_material))
        .route("/materials/{material_id}/stock", patch(update_stock))
        .route(
            "/procedure-materials",
            post(create_procedure_material).get(list_procedure_materials),
        )
        .route("/procedure-cost/{procedure_type}", get(procedure_cost))
}

pub async fn create_material(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreateMaterialRequest>,
) -> Result<Json<MaterialRow>, ApiError> {
    if req.name.trim().is_empty() || req.unit.trim().is_empty() {
        return Err(ApiError::validation("name and unit are required"));
    }
    if !req.unit_price.is_finite() || req.unit_price < 0.0 {
        return Err(ApiError::validation("unitPrice must be a non-negative number"));
    }
    if req.stock_quantity < 0 || req.minimum_stock.is_some_and(|m| m < 0) {
        return Err(ApiError::validation("stock levels must not be negative"));
    }
    Ok(Json(state.repo.create_material(&req).await?))
}

pub async fn list_materials(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<MaterialRow>>, ApiError> {
    Ok(Json(state.repo.list_materials().await?))
}

pub async fn get_material(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(material_id): ApiPath<Uuid>,
) -> Result<Json<MaterialRow>, ApiError> {
    state
        .repo
        .get_material(material_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("material"))
}

pub async fn update_stock(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(material_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateStockRequest>,
) -> Result<Json<MaterialRow>, ApiError> {
    if req.stock_quantity < 0 {
        return Err(ApiError::validation("stockQuantity must not be negative"));
    }
    let row = state
        .repo
        .update_material_stock(material_id, req.stock_quantity)
        .await?
        .ok_or_else(|| ApiError::not_found("material"))?;

    if inventory::is_low_stock(&row) {
        tracing::info!(material = %row.name, stock = row.stock_quantity, "material below minimum stock");
    }
    Ok(Json(row))
}

pub async fn low_stock_materials(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<Vec<MaterialRow>>, ApiError> {
    Ok(Json(inventory::get_low_stock_materials(state.repo.as_ref()).await?))
}

pub async fn create_procedure_material(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreateProcedureMaterialRequest>,
) -> Result<Json<ProcedureMaterialRow>, ApiError> {
    if req.procedure_type.trim().is_empty() {
        return Err(ApiError::validation("procedureType is required"));
    }
    if !req.quantity_used.is_finite() || req.quantity_used <= 0.0 {
        return Err(ApiError::validation("quantityUsed must be a positive number"));
    }
    if state.repo.get_material(req.material_id).await?.is_none() {
        return Err(ApiError::not_found("material"));
    }
    Ok(Json(state.repo.create_procedure_material(&req).await?))
}

pub async fn list_procedure_materials(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(q): ApiQuery<ProcedureMaterialFilter>,
) -> Result<Json<Vec<ProcedureMaterialRow>>, ApiError> {
    let rows = state
        .repo
        .list_procedure_materials(q.procedure_type.as_deref())
        .await?;
    Ok(Json(rows))
}

pub async fn procedure_cost(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(procedure_type): ApiPath<String>,
) -> Result<Json<ProcedureCost>, ApiError> {
    let cost = inventory::calculate_procedure_cost(state.repo.as_ref(), &procedure_type).await?;
    Ok(Json(cost))
}
