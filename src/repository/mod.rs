//! Storage access behind a single trait.
//!
//! Handlers and services only see `dyn Repository`; the concrete backend
//! (PostgreSQL or SQLite) is chosen from `DATABASE_URL` at startup.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::*;

#[macro_use]
mod sql;
pub mod postgres;
pub mod sqlite;

pub use postgres::PgRepository;
pub use sqlite::SqliteRepository;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record conflicts with existing data: {0}")]
    Conflict(String),
    #[error("record references a missing row: {0}")]
    MissingReference(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
            if db.is_foreign_key_violation() {
                return StoreError::MissingReference(db.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Goal progress write. `completed_at` is set only on the completion transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub current_value: f64,
    pub completed_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait Repository: Send + Sync {
    /* users & sessions */
    async fn count_users(&self) -> StoreResult<i64>;
    async fn create_user(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> StoreResult<UserRow>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;
    async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<SessionTokenRow>;
    async fn find_active_session(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SessionLookupRow>>;
    async fn touch_session(&self, session_token_id: Uuid, now: DateTime<Utc>) -> StoreResult<()>;
    async fn revoke_session(&self, session_token_id: Uuid, now: DateTime<Utc>) -> StoreResult<()>;

    /* patients */
    async fn create_patient(&self, req: &CreatePatientRequest) -> StoreResult<PatientRow>;
    async fn list_patients(&self, search: Option<&str>) -> StoreResult<Vec<PatientRow>>;
    async fn get_patient(&self, patient_id: Uuid) -> StoreResult<Option<PatientRow>>;
    async fn update_patient(
        &self,
        patient_id: Uuid,
        req: &UpdatePatientRequest,
    ) -> StoreResult<Option<PatientRow>>;
    /// Patients with `from <= created_at < to`.
    async fn list_patients_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Vec<PatientRow>>;
    async fn count_patients(&self) -> StoreResult<i64>;

    /* dentists */
    async fn create_dentist(&self, req: &CreateDentistRequest) -> StoreResult<DentistRow>;
    async fn list_dentists(&self) -> StoreResult<Vec<DentistRow>>;
    async fn get_dentist(&self, dentist_id: Uuid) -> StoreResult<Option<DentistRow>>;
    async fn update_dentist(
        &self,
        dentist_id: Uuid,
        req: &UpdateDentistRequest,
    ) -> StoreResult<Option<DentistRow>>;
    async fn count_dentists(&self) -> StoreResult<i64>;

    /* procedures */
    async fn create_procedure(&self, req: &CreateProcedureRequest) -> StoreResult<ProcedureRow>;
    async fn list_procedures(&self, filter: &ProcedureFilter) -> StoreResult<Vec<ProcedureRow>>;
    async fn get_procedure(&self, procedure_id: Uuid) -> StoreResult<Option<ProcedureRow>>;
    async fn update_payment_status(
        &self,
        procedure_id: Uuid,
        status: PaymentStatus,
    ) -> StoreResult<Option<ProcedureRow>>;
    /// Procedures dated inside `[start, end]`, both ends inclusive.
    async fn list_procedures_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<ProcedureRow>>;

    /* invoices */
    async fn create_invoice(&self, req: &CreateInvoiceRequest) -> StoreResult<InvoiceRow>;
    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> StoreResult<Vec<InvoiceRow>>;
    async fn get_invoice(&self, invoice_id: Uuid) -> StoreResult<Option<InvoiceRow>>;
    async fn update_invoice_status(
        &self,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> StoreResult<Option<InvoiceRow>>;

    /* appointments */
    async fn create_appointment(
        &self,
        req: &CreateAppointmentRequest,
        duration_minutes: i64,
    ) -> StoreResult<AppointmentRow>;
    async fn list_appointments(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<AppointmentRow>>;
    async fn get_appointment(&self, appointment_id: Uuid) -> StoreResult<Option<AppointmentRow>>;
    async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> StoreResult<Option<AppointmentRow>>;

    /* materials */
    async fn create_material(&self, req: &CreateMaterialRequest) -> StoreResult<MaterialRow>;
    async fn list_materials(&self) -> StoreResult<Vec<MaterialRow>>;
    async fn get_material(&self, material_id: Uuid) -> StoreResult<Option<MaterialRow>>;
    async fn update_material_stock(
        &self,
        material_id: Uuid,
        stock_quantity: i64,
    ) -> StoreResult<Option<MaterialRow>>;
    async fn create_procedure_material(
        &self,
        req: &CreateProcedureMaterialRequest,
    ) -> StoreResult<ProcedureMaterialRow>;
    async fn list_procedure_materials(
        &self,
        procedure_type: Option<&str>,
    ) -> StoreResult<Vec<ProcedureMaterialRow>>;
    /// Links for `procedure_type` joined to their material.
    async fn list_material_usage(&self, procedure_type: &str) -> StoreResult<Vec<MaterialUsageRow>>;

    /* financial goals */
    async fn create_goal(&self, req: &CreateGoalRequest) -> StoreResult<FinancialGoalRow>;
    async fn list_goals(&self) -> StoreResult<Vec<FinancialGoalRow>>;
    async fn list_active_goals(&self) -> StoreResult<Vec<FinancialGoalRow>>;
    /// Goals with `is_active AND NOT is_completed`.
    async fn list_goals_pending_evaluation(&self) -> StoreResult<Vec<FinancialGoalRow>>;
    async fn get_goal(&self, goal_id: Uuid) -> StoreResult<Option<FinancialGoalRow>>;
    async fn update_goal(
        &self,
        goal_id: Uuid,
        req: &UpdateGoalRequest,
    ) -> StoreResult<Option<FinancialGoalRow>>;
    /// Writes progress unless the goal is already completed; `None` when nothing was written.
    async fn record_goal_progress(
        &self,
        goal_id: Uuid,
        progress: GoalProgress,
    ) -> StoreResult<Option<FinancialGoalRow>>;
    async fn delete_goal(&self, goal_id: Uuid) -> StoreResult<bool>;

    /* achievements */
    async fn create_achievement(&self, req: &CreateAchievementRequest) -> StoreResult<AchievementRow>;
    async fn list_achievements(&self) -> StoreResult<Vec<AchievementRow>>;
    async fn get_achievement(&self, achievement_id: Uuid) -> StoreResult<Option<AchievementRow>>;
    async fn find_award(&self, achievement_id: Uuid) -> StoreResult<Option<UserAchievementRow>>;
    async fn insert_award(
        &self,
        achievement_id: Uuid,
        earned_date: DateTime<Utc>,
    ) -> StoreResult<UserAchievementRow>;
    async fn count_awards(&self, achievement_id: Uuid) -> StoreResult<i64>;
    async fn list_earned_achievements(&self) -> StoreResult<Vec<EarnedAchievementRow>>;
}
