// src/routes/appointment_routes.rs

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
        AppState, AppointmentFilter, AppointmentRow, CreateAppointmentRequest,
        UpdateAppointmentStatusRequest,
    },
};

const DEFAULT_DURATION_MIN: i64 = 60;
const MAX_DURATION_MIN: i64 = 8 * 60;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", post(create_appointment).get(list_appointments))
        .route("/appointments/{appointment_id}", get(get_appointment))
        .route(
            "/appointments/{appointment_id}/status",
            patch(update_appointment_status),
        )
}

/* ============================================================
   POST /appointments
   ============================================================ */

pub async fn create_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiJson(req): ApiJson<CreateAppointmentRequest>,
) -> Result<Json<AppointmentRow>, ApiError> {
    let duration = req.duration_minutes.unwrap_or(DEFAULT_DURATION_MIN);
    if !(1..=MAX_DURATION_MIN).contains(&duration) {
        return Err(ApiError::validation(format!(
            "durationMinutes must be between 1 and {MAX_DURATION_MIN}"
        )));
    }

    if state.repo.get_patient(req.patient_id).await?.is_none() {
        return Err(ApiError::not_found("patient"));
    }
    if let Some(dentist_id) = req.dentist_id {
        if state.repo.get_dentist(dentist_id).await?.is_none() {
            return Err(ApiError::not_found("dentist"));
        }
    }

    Ok(Json(state.repo.create_appointment(&req, duration).await?))
}

/* ============================================================
   GET /appointments?from=&to=
   ============================================================ */

pub async fn list_appointments(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiQuery(q): ApiQuery<AppointmentFilter>,
) -> Result<Json<Vec<AppointmentRow>>, ApiError> {
    if let (Some(from), Some(to)) = (q.from, q.to) {
        if to <= from {
            return Err(ApiError::validation("to must be after from"));
        }
    }
    Ok(Json(state.repo.list_appointments(q.from, q.to).await?))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(appointment_id): ApiPath<Uuid>,
) -> Result<Json<AppointmentRow>, ApiError> {
    state
        .repo
        .get_appointment(appointment_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("appointment"))
}

pub async fn update_appointment_status(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(appointment_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateAppointmentStatusRequest>,
) -> Result<Json<AppointmentRow>, ApiError> {
    state
        .repo
        .update_appointment_status(appointment_id, req.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("appointment"))
}
