use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::repository::Repository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub session_ttl_hours: i64,
}

/* -------------------------
   Enumerations (stored as TEXT)
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalType {
    Revenue,
    ProcedureCount,
    NewPatients,
    SpecificDentist,
    SpecificProcedure,
}

impl GoalType {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::Revenue => "REVENUE",
            GoalType::ProcedureCount => "PROCEDURE_COUNT",
            GoalType::NewPatients => "NEW_PATIENTS",
            GoalType::SpecificDentist => "SPECIFIC_DENTIST",
            GoalType::SpecificProcedure => "SPECIFIC_PROCEDURE",
        }
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REVENUE" => Ok(GoalType::Revenue),
            "PROCEDURE_COUNT" => Ok(GoalType::ProcedureCount),
            "NEW_PATIENTS" => Ok(GoalType::NewPatients),
            "SPECIFIC_DENTIST" => Ok(GoalType::SpecificDentist),
            "SPECIFIC_PROCEDURE" => Ok(GoalType::SpecificProcedure),
            other => Err(other.to_string()),
        }
    }
}

/// Informational only; nothing schedules goals by frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl GoalFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalFrequency::Daily => "DAILY",
            GoalFrequency::Weekly => "WEEKLY",
            GoalFrequency::Monthly => "MONTHLY",
            GoalFrequency::Quarterly => "QUARTERLY",
            GoalFrequency::Yearly => "YEARLY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalDifficulty {
    Easy,
    Medium,
    Hard,
}

impl GoalDifficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalDifficulty::Easy => "EASY",
            GoalDifficulty::Medium => "MEDIUM",
            GoalDifficulty::Hard => "HARD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Partial => "PARTIAL",
            PaymentStatus::Paid => "PAID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SessionTokenRow {
    pub session_token_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Active session joined with its (active) owner.
#[derive(Debug, sqlx::FromRow)]
pub struct SessionLookupRow {
    pub session_token_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PatientRow {
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A referring practitioner or clinic.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DentistRow {
    pub dentist_id: Uuid,
    pub name: String,
    pub clinic_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRow {
    pub procedure_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: String,
    pub tooth_number: Option<String>,
    pub value: f64,
    pub procedure_date: NaiveDate,
    pub payment_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub patient_id: Uuid,
    pub procedure_id: Option<Uuid>,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRow {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub procedure_type: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRow {
    pub material_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub unit_price: f64,
    pub stock_quantity: i64,
    pub minimum_stock: Option<i64>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureMaterialRow {
    pub procedure_material_id: Uuid,
    pub procedure_type: String,
    pub material_id: Uuid,
    pub quantity_used: f64,
}

/// A procedure-material link joined with the material's name and price.
#[derive(Debug, Clone, FromRow)]
pub struct MaterialUsageRow {
    pub material_id: Uuid,
    pub material_name: String,
    pub unit: String,
    pub unit_price: f64,
    pub quantity_used: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoalRow {
    pub goal_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: String,
    pub difficulty: String,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: Option<String>,
    pub is_active: bool,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRow {
    pub achievement_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub point_value: i64,
    pub achievement_type: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievementRow {
    pub user_achievement_id: Uuid,
    pub achievement_id: Uuid,
    pub earned_date: DateTime<Utc>,
}

/// Award record joined with the achievement it unlocks.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EarnedAchievementRow {
    pub user_achievement_id: Uuid,
    pub achievement_id: Uuid,
    pub earned_date: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub point_value: i64,
    pub achievement_type: String,
    pub image_url: Option<String>,
}

/* -------------------------
   API DTOs: requests
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "coerce_opt_date")]
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "coerce_opt_date")]
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDentistRequest {
    pub name: String,
    pub clinic_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDentistRequest {
    pub name: Option<String>,
    pub clinic_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcedureRequest {
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: String,
    pub tooth_number: Option<String>,
    pub value: f64,
    #[serde(deserialize_with = "coerce_date")]
    pub procedure_date: NaiveDate,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub patient_id: Uuid,
    pub procedure_id: Option<Uuid>,
    pub amount: f64,
    #[serde(deserialize_with = "coerce_date")]
    pub issue_date: NaiveDate,
    #[serde(default, deserialize_with = "coerce_opt_date")]
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    pub procedure_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialRequest {
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub unit_price: f64,
    pub stock_quantity: i64,
    pub minimum_stock: Option<i64>,
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockRequest {
    pub stock_quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcedureMaterialRequest {
    pub procedure_type: String,
    pub material_id: Uuid,
    pub quantity_used: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureMaterialFilter {
    pub procedure_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    #[serde(deserialize_with = "coerce_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "coerce_date")]
    pub end_date: NaiveDate,
    pub frequency: GoalFrequency,
    pub difficulty: GoalDifficulty,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: Option<String>,
    pub is_active: Option<bool>,
}

/// Edits goal definition only; progress and completion are owned by the evaluator.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub goal_type: Option<GoalType>,
    pub target_value: Option<f64>,
    #[serde(default, deserialize_with = "coerce_opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "coerce_opt_date")]
    pub end_date: Option<NaiveDate>,
    pub frequency: Option<GoalFrequency>,
    pub difficulty: Option<GoalDifficulty>,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    pub value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAchievementRequest {
    pub name: String,
    pub description: Option<String>,
    pub point_value: i64,
    pub achievement_type: String,
    pub image_url: Option<String>,
}

/* -------------------------
   API DTOs: responses
--------------------------*/

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/* -------------------------
   Helpers
--------------------------*/

/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_coerced_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

fn coerce_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_coerced_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

fn coerce_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_coerced_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerced_dates_accept_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_coerced_date("2024-01-31"), Some(expected));
        assert_eq!(parse_coerced_date("2024-01-31T10:15:00Z"), Some(expected));
        assert_eq!(parse_coerced_date("2024-01-31T10:15:00.250"), Some(expected));
        assert_eq!(parse_coerced_date("31/01/2024"), None);
    }

    #[test]
    fn goal_request_rejects_unknown_goal_type() {
        let body = r#"{
            "name": "Q1",
            "goalType": "MOST_SMILES",
            "targetValue": 10,
            "startDate": "2024-01-01",
            "endDate": "2024-03-31",
            "frequency": "MONTHLY",
            "difficulty": "EASY"
        }"#;
        assert!(serde_json::from_str::<CreateGoalRequest>(body).is_err());
    }

    #[test]
    fn goal_type_round_trips_through_storage_text() {
        for ty in [
            GoalType::Revenue,
            GoalType::ProcedureCount,
            GoalType::NewPatients,
            GoalType::SpecificDentist,
            GoalType::SpecificProcedure,
        ] {
            assert_eq!(ty.as_str().parse::<GoalType>(), Ok(ty));
        }
        assert!("WEEKLY".parse::<GoalType>().is_err());
    }
}
