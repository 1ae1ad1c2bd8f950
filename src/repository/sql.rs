// Portable SQL shared by the PostgreSQL and SQLite repositories.
//
// Both drivers accept `$N` placeholders. Ids and timestamps are produced
// here rather than by column defaults so the statements stay identical.

macro_rules! patient_columns {
    () => {
        "patient_id, first_name, last_name, email, phone, birth_date, notes, created_at, updated_at"
    };
}

macro_rules! dentist_columns {
    () => {
        "dentist_id, name, clinic_name, email, phone, specialty, created_at, updated_at"
    };
}

macro_rules! procedure_columns {
    () => {
        "procedure_id, patient_id, dentist_id, procedure_type, tooth_number, value, procedure_date, payment_status, notes, created_at"
    };
}

macro_rules! invoice_columns {
    () => {
        "invoice_id, patient_id, procedure_id, amount, issue_date, due_date, status, notes, created_at"
    };
}

macro_rules! appointment_columns {
    () => {
        "appointment_id, patient_id, dentist_id, scheduled_at, duration_minutes, procedure_type, status, notes, created_at"
    };
}

macro_rules! material_columns {
    () => {
        "material_id, name, category, unit, unit_price, stock_quantity, minimum_stock, supplier, created_at, updated_at"
    };
}

macro_rules! goal_columns {
    () => {
        "goal_id, name, description, goal_type, target_value, current_value, start_date, end_date, frequency, difficulty, dentist_id, procedure_type, is_active, is_completed, completed_at, created_at, updated_at"
    };
}

macro_rules! achievement_columns {
    () => {
        "achievement_id, name, description, point_value, achievement_type, image_url, created_at"
    };
}

/// Expands to a repository struct over `$pool` implementing [`Repository`].
macro_rules! sql_repository {
    ($name:ident, $pool:ty) => {
        #[derive(Clone)]
        pub struct $name {
            pool: $pool,
        }

        impl $name {
            pub fn new(pool: $pool) -> Self {
                Self { pool }
            }

            #[cfg(test)]
            pub(crate) fn pool(&self) -> &$pool {
                &self.pool
            }
        }

        #[async_trait]
        impl Repository for $name {
            /* ---------------- users & sessions ---------------- */

            async fn count_users(&self) -> StoreResult<i64> {
                let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_user")
                    .fetch_one(&self.pool)
                    .await?;
                Ok(n)
            }

            async fn create_user(
                &self,
                username: &str,
                display_name: &str,
                password_hash: &str,
                is_admin: bool,
            ) -> StoreResult<UserRow> {
                let row = sqlx::query_as::<_, UserRow>(
                    r#"
                    INSERT INTO app_user
                        (user_id, username, display_name, password_hash, is_admin, is_active, created_at)
                    VALUES ($1, $2, $3, $4, $5, TRUE, $6)
                    RETURNING user_id, username, display_name, password_hash, is_admin, is_active
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(username)
                .bind(display_name)
                .bind(password_hash)
                .bind(is_admin)
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
                let row = sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT user_id, username, display_name, password_hash, is_admin, is_active
                    FROM app_user
                    WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn create_session(
                &self,
                user_id: Uuid,
                token_hash: &str,
                expires_at: DateTime<Utc>,
            ) -> StoreResult<SessionTokenRow> {
                let row = sqlx::query_as::<_, SessionTokenRow>(
                    r#"
                    INSERT INTO session_token
                        (session_token_id, user_id, session_token_hash, expires_at, created_at)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING session_token_id, user_id, expires_at
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(token_hash)
                .bind(expires_at)
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn find_active_session(
                &self,
                token_hash: &str,
                now: DateTime<Utc>,
            ) -> StoreResult<Option<SessionLookupRow>> {
                let row = sqlx::query_as::<_, SessionLookupRow>(
                    r#"
                    SELECT st.session_token_id, st.user_id, u.username, u.display_name, u.is_admin
                    FROM session_token st
                    JOIN app_user u ON u.user_id = st.user_id
                    WHERE st.session_token_hash = $1
                      AND st.revoked_at IS NULL
                      AND st.expires_at > $2
                      AND u.is_active = TRUE
                    "#,
                )
                .bind(token_hash)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn touch_session(&self, session_token_id: Uuid, now: DateTime<Utc>) -> StoreResult<()> {
                sqlx::query("UPDATE session_token SET last_seen_at = $2 WHERE session_token_id = $1")
                    .bind(session_token_id)
                    .bind(now)
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }

            async fn revoke_session(&self, session_token_id: Uuid, now: DateTime<Utc>) -> StoreResult<()> {
                sqlx::query(
                    r#"
                    UPDATE session_token
                    SET revoked_at = $2
                    WHERE session_token_id = $1
                      AND revoked_at IS NULL
                    "#,
                )
                .bind(session_token_id)
                .bind(now)
                .execute(&self.pool)
                .await?;
                Ok(())
            }

            /* ---------------- patients ---------------- */

            async fn create_patient(&self, req: &CreatePatientRequest) -> StoreResult<PatientRow> {
                let now = Utc::now();
                let row = sqlx::query_as::<_, PatientRow>(concat!(
                    "INSERT INTO patient (",
                    patient_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING ",
                    patient_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.first_name.trim())
                .bind(req.last_name.trim())
                .bind(req.email.as_deref())
                .bind(req.phone.as_deref())
                .bind(req.birth_date)
                .bind(req.notes.as_deref())
                .bind(now)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_patients(&self, search: Option<&str>) -> StoreResult<Vec<PatientRow>> {
                let pattern = search.map(|s| format!("%{}%", s.to_lowercase()));
                let rows = sqlx::query_as::<_, PatientRow>(concat!(
                    "SELECT ",
                    patient_columns!(),
                    " FROM patient
                      WHERE ($1 IS NULL
                         OR LOWER(first_name || ' ' || last_name) LIKE $1
                         OR LOWER(COALESCE(email, '')) LIKE $1)
                      ORDER BY last_name ASC, first_name ASC"
                ))
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_patient(&self, patient_id: Uuid) -> StoreResult<Option<PatientRow>> {
                let row = sqlx::query_as::<_, PatientRow>(concat!(
                    "SELECT ",
                    patient_columns!(),
                    " FROM patient WHERE patient_id = $1"
                ))
                .bind(patient_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_patient(
                &self,
                patient_id: Uuid,
                req: &UpdatePatientRequest,
            ) -> StoreResult<Option<PatientRow>> {
                let row = sqlx::query_as::<_, PatientRow>(concat!(
                    "UPDATE patient SET
                        first_name = COALESCE($2, first_name),
                        last_name  = COALESCE($3, last_name),
                        email      = COALESCE($4, email),
                        phone      = COALESCE($5, phone),
                        birth_date = COALESCE($6, birth_date),
                        notes      = COALESCE($7, notes),
                        updated_at = $8
                     WHERE patient_id = $1
                     RETURNING ",
                    patient_columns!()
                ))
                .bind(patient_id)
                .bind(req.first_name.as_deref().map(str::trim))
                .bind(req.last_name.as_deref().map(str::trim))
                .bind(req.email.as_deref())
                .bind(req.phone.as_deref())
                .bind(req.birth_date)
                .bind(req.notes.as_deref())
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_patients_created_between(
                &self,
                from: DateTime<Utc>,
                to: DateTime<Utc>,
            ) -> StoreResult<Vec<PatientRow>> {
                let rows = sqlx::query_as::<_, PatientRow>(concat!(
                    "SELECT ",
                    patient_columns!(),
                    " FROM patient
                      WHERE created_at >= $1
                        AND created_at < $2
                      ORDER BY created_at ASC"
                ))
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn count_patients(&self) -> StoreResult<i64> {
                let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patient")
                    .fetch_one(&self.pool)
                    .await?;
                Ok(n)
            }

            /* ---------------- dentists ---------------- */

            async fn create_dentist(&self, req: &CreateDentistRequest) -> StoreResult<DentistRow> {
                let row = sqlx::query_as::<_, DentistRow>(concat!(
                    "INSERT INTO dentist (",
                    dentist_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING ",
                    dentist_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.name.trim())
                .bind(req.clinic_name.as_deref())
                .bind(req.email.as_deref())
                .bind(req.phone.as_deref())
                .bind(req.specialty.as_deref())
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_dentists(&self) -> StoreResult<Vec<DentistRow>> {
                let rows = sqlx::query_as::<_, DentistRow>(concat!(
                    "SELECT ",
                    dentist_columns!(),
                    " FROM dentist ORDER BY name ASC"
                ))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_dentist(&self, dentist_id: Uuid) -> StoreResult<Option<DentistRow>> {
                let row = sqlx::query_as::<_, DentistRow>(concat!(
                    "SELECT ",
                    dentist_columns!(),
                    " FROM dentist WHERE dentist_id = $1"
                ))
                .bind(dentist_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_dentist(
                &self,
                dentist_id: Uuid,
                req: &UpdateDentistRequest,
            ) -> StoreResult<Option<DentistRow>> {
                let row = sqlx::query_as::<_, DentistRow>(concat!(
                    "UPDATE dentist SET
                        name        = COALESCE($2, name),
                        clinic_name = COALESCE($3, clinic_name),
                        email       = COALESCE($4, email),
                        phone       = COALESCE($5, phone),
                        specialty   = COALESCE($6, specialty),
                        updated_at  = $7
                     WHERE dentist_id = $1
                     RETURNING ",
                    dentist_columns!()
                ))
                .bind(dentist_id)
                .bind(req.name.as_deref().map(str::trim))
                .bind(req.clinic_name.as_deref())
                .bind(req.email.as_deref())
                .bind(req.phone.as_deref())
                .bind(req.specialty.as_deref())
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn count_dentists(&self) -> StoreResult<i64> {
                let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dentist")
                    .fetch_one(&self.pool)
                    .await?;
                Ok(n)
            }

            /* ---------------- procedures ---------------- */

            async fn create_procedure(&self, req: &CreateProcedureRequest) -> StoreResult<ProcedureRow> {
                let status = req.payment_status.unwrap_or(PaymentStatus::Pending);
                let row = sqlx::query_as::<_, ProcedureRow>(concat!(
                    "INSERT INTO dental_procedure (",
                    procedure_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING ",
                    procedure_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.patient_id)
                .bind(req.dentist_id)
                .bind(req.procedure_type.trim())
                .bind(req.tooth_number.as_deref())
                .bind(req.value)
                .bind(req.procedure_date)
                .bind(status.as_str())
                .bind(req.notes.as_deref())
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_procedures(&self, filter: &ProcedureFilter) -> StoreResult<Vec<ProcedureRow>> {
                let rows = sqlx::query_as::<_, ProcedureRow>(concat!(
                    "SELECT ",
                    procedure_columns!(),
                    " FROM dental_procedure
                      WHERE ($1 IS NULL OR procedure_date >= $1)
                        AND ($2 IS NULL OR procedure_date <= $2)
                        AND ($3 IS NULL OR dentist_id = $3)
                        AND ($4 IS NULL OR procedure_type = $4)
                      ORDER BY procedure_date DESC, created_at DESC"
                ))
                .bind(filter.from)
                .bind(filter.to)
                .bind(filter.dentist_id)
                .bind(filter.procedure_type.as_deref())
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_procedure(&self, procedure_id: Uuid) -> StoreResult<Option<ProcedureRow>> {
                let row = sqlx::query_as::<_, ProcedureRow>(concat!(
                    "SELECT ",
                    procedure_columns!(),
                    " FROM dental_procedure WHERE procedure_id = $1"
                ))
                .bind(procedure_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_payment_status(
                &self,
                procedure_id: Uuid,
                status: PaymentStatus,
            ) -> StoreResult<Option<ProcedureRow>> {
                let row = sqlx::query_as::<_, ProcedureRow>(concat!(
                    "UPDATE dental_procedure SET payment_status = $2 WHERE procedure_id = $1 RETURNING ",
                    procedure_columns!()
                ))
                .bind(procedure_id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_procedures_between(
                &self,
                start: NaiveDate,
                end: NaiveDate,
            ) -> StoreResult<Vec<ProcedureRow>> {
                let rows = sqlx::query_as::<_, ProcedureRow>(concat!(
                    "SELECT ",
                    procedure_columns!(),
                    " FROM dental_procedure
                      WHERE procedure_date >= $1
                        AND procedure_date <= $2
                      ORDER BY procedure_date ASC, procedure_id ASC"
                ))
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            /* ---------------- invoices ---------------- */

            async fn create_invoice(&self, req: &CreateInvoiceRequest) -> StoreResult<InvoiceRow> {
                let status = req.status.unwrap_or(InvoiceStatus::Pending);
                let row = sqlx::query_as::<_, InvoiceRow>(concat!(
                    "INSERT INTO invoice (",
                    invoice_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
                    invoice_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.patient_id)
                .bind(req.procedure_id)
                .bind(req.amount)
                .bind(req.issue_date)
                .bind(req.due_date)
                .bind(status.as_str())
                .bind(req.notes.as_deref())
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_invoices(&self, status: Option<InvoiceStatus>) -> StoreResult<Vec<InvoiceRow>> {
                let rows = sqlx::query_as::<_, InvoiceRow>(concat!(
                    "SELECT ",
                    invoice_columns!(),
                    " FROM invoice
                      WHERE ($1 IS NULL OR status = $1)
                      ORDER BY issue_date DESC, created_at DESC"
                ))
                .bind(status.map(InvoiceStatus::as_str))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_invoice(&self, invoice_id: Uuid) -> StoreResult<Option<InvoiceRow>> {
                let row = sqlx::query_as::<_, InvoiceRow>(concat!(
                    "SELECT ",
                    invoice_columns!(),
                    " FROM invoice WHERE invoice_id = $1"
                ))
                .bind(invoice_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_invoice_status(
                &self,
                invoice_id: Uuid,
                status: InvoiceStatus,
            ) -> StoreResult<Option<InvoiceRow>> {
                let row = sqlx::query_as::<_, InvoiceRow>(concat!(
                    "UPDATE invoice SET status = $2 WHERE invoice_id = $1 RETURNING ",
                    invoice_columns!()
                ))
                .bind(invoice_id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            /* ---------------- appointments ---------------- */

            async fn create_appointment(
                &self,
                req: &CreateAppointmentRequest,
                duration_minutes: i64,
            ) -> StoreResult<AppointmentRow> {
                let row = sqlx::query_as::<_, AppointmentRow>(concat!(
                    "INSERT INTO appointment (",
                    appointment_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
                    appointment_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.patient_id)
                .bind(req.dentist_id)
                .bind(req.scheduled_at)
                .bind(duration_minutes)
                .bind(req.procedure_type.as_deref())
                .bind(AppointmentStatus::Scheduled.as_str())
                .bind(req.notes.as_deref())
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_appointments(
                &self,
                from: Option<DateTime<Utc>>,
                to: Option<DateTime<Utc>>,
            ) -> StoreResult<Vec<AppointmentRow>> {
                let rows = sqlx::query_as::<_, AppointmentRow>(concat!(
                    "SELECT ",
                    appointment_columns!(),
                    " FROM appointment
                      WHERE ($1 IS NULL OR scheduled_at >= $1)
                        AND ($2 IS NULL OR scheduled_at < $2)
                      ORDER BY scheduled_at ASC"
                ))
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_appointment(&self, appointment_id: Uuid) -> StoreResult<Option<AppointmentRow>> {
                let row = sqlx::query_as::<_, AppointmentRow>(concat!(
                    "SELECT ",
                    appointment_columns!(),
                    " FROM appointment WHERE appointment_id = $1"
                ))
                .bind(appointment_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_appointment_status(
                &self,
                appointment_id: Uuid,
                status: AppointmentStatus,
            ) -> StoreResult<Option<AppointmentRow>> {
                let row = sqlx::query_as::<_, AppointmentRow>(concat!(
                    "UPDATE appointment SET status = $2 WHERE appointment_id = $1 RETURNING ",
                    appointment_columns!()
                ))
                .bind(appointment_id)
                .bind(status.as_str())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            /* ---------------- materials ---------------- */

            async fn create_material(&self, req: &CreateMaterialRequest) -> StoreResult<MaterialRow> {
                let row = sqlx::query_as::<_, MaterialRow>(concat!(
                    "INSERT INTO material (",
                    material_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING ",
                    material_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.name.trim())
                .bind(req.category.as_deref())
                .bind(req.unit.trim())
                .bind(req.unit_price)
                .bind(req.stock_quantity)
                .bind(req.minimum_stock)
                .bind(req.supplier.as_deref())
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_materials(&self) -> StoreResult<Vec<MaterialRow>> {
                let rows = sqlx::query_as::<_, MaterialRow>(concat!(
                    "SELECT ",
                    material_columns!(),
                    " FROM material ORDER BY name ASC"
                ))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_material(&self, material_id: Uuid) -> StoreResult<Option<MaterialRow>> {
                let row = sqlx::query_as::<_, MaterialRow>(concat!(
                    "SELECT ",
                    material_columns!(),
                    " FROM material WHERE material_id = $1"
                ))
                .bind(material_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_material_stock(
                &self,
                material_id: Uuid,
                stock_quantity: i64,
            ) -> StoreResult<Option<MaterialRow>> {
                let row = sqlx::query_as::<_, MaterialRow>(concat!(
                    "UPDATE material SET stock_quantity = $2, updated_at = $3 WHERE material_id = $1 RETURNING ",
                    material_columns!()
                ))
                .bind(material_id)
                .bind(stock_quantity)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn create_procedure_material(
                &self,
                req: &CreateProcedureMaterialRequest,
            ) -> StoreResult<ProcedureMaterialRow> {
                let row = sqlx::query_as::<_, ProcedureMaterialRow>(
                    r#"
                    INSERT INTO procedure_material
                        (procedure_material_id, procedure_type, material_id, quantity_used)
                    VALUES ($1, $2, $3, $4)
                    RETURNING procedure_material_id, procedure_type, material_id, quantity_used
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(req.procedure_type.trim())
                .bind(req.material_id)
                .bind(req.quantity_used)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_procedure_materials(
                &self,
                procedure_type: Option<&str>,
            ) -> StoreResult<Vec<ProcedureMaterialRow>> {
                let rows = sqlx::query_as::<_, ProcedureMaterialRow>(
                    r#"
                    SELECT procedure_material_id, procedure_type, material_id, quantity_used
                    FROM procedure_material
                    WHERE ($1 IS NULL OR procedure_type = $1)
                    ORDER BY procedure_type ASC
                    "#,
                )
                .bind(procedure_type)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn list_material_usage(&self, procedure_type: &str) -> StoreResult<Vec<MaterialUsageRow>> {
                let rows = sqlx::query_as::<_, MaterialUsageRow>(
                    r#"
                    SELECT
                      m.material_id,
                      m.name AS material_name,
                      m.unit,
                      m.unit_price,
                      pm.quantity_used
                    FROM procedure_material pm
                    JOIN material m ON m.material_id = pm.material_id
                    WHERE pm.procedure_type = $1
                    ORDER BY m.name ASC
                    "#,
                )
                .bind(procedure_type)
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            /* ---------------- financial goals ---------------- */

            async fn create_goal(&self, req: &CreateGoalRequest) -> StoreResult<FinancialGoalRow> {
                let row = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "INSERT INTO financial_goal (",
                    goal_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, FALSE, NULL, $14, $14) RETURNING ",
                    goal_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.name.trim())
                .bind(req.description.as_deref())
                .bind(req.goal_type.as_str())
                .bind(req.target_value)
                .bind(0.0_f64)
                .bind(req.start_date)
                .bind(req.end_date)
                .bind(req.frequency.as_str())
                .bind(req.difficulty.as_str())
                .bind(req.dentist_id)
                .bind(req.procedure_type.as_deref())
                .bind(req.is_active.unwrap_or(true))
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_goals(&self) -> StoreResult<Vec<FinancialGoalRow>> {
                let rows = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "SELECT ",
                    goal_columns!(),
                    " FROM financial_goal ORDER BY start_date DESC, name ASC"
                ))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn list_active_goals(&self) -> StoreResult<Vec<FinancialGoalRow>> {
                let rows = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "SELECT ",
                    goal_columns!(),
                    " FROM financial_goal WHERE is_active = TRUE ORDER BY end_date ASC, name ASC"
                ))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn list_goals_pending_evaluation(&self) -> StoreResult<Vec<FinancialGoalRow>> {
                let rows = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "SELECT ",
                    goal_columns!(),
                    " FROM financial_goal
                      WHERE is_active = TRUE
                        AND is_completed = FALSE
                      ORDER BY created_at ASC"
                ))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_goal(&self, goal_id: Uuid) -> StoreResult<Option<FinancialGoalRow>> {
                let row = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "SELECT ",
                    goal_columns!(),
                    " FROM financial_goal WHERE goal_id = $1"
                ))
                .bind(goal_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn update_goal(
                &self,
                goal_id: Uuid,
                req: &UpdateGoalRequest,
            ) -> StoreResult<Option<FinancialGoalRow>> {
                let row = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "UPDATE financial_goal SET
                        name           = COALESCE($2, name),
                        description    = COALESCE($3, description),
                        goal_type      = COALESCE($4, goal_type),
                        target_value   = COALESCE($5, target_value),
                        start_date     = COALESCE($6, start_date),
                        end_date       = COALESCE($7, end_date),
                        frequency      = COALESCE($8, frequency),
                        difficulty     = COALESCE($9, difficulty),
                        dentist_id     = COALESCE($10, dentist_id),
                        procedure_type = COALESCE($11, procedure_type),
                        is_active      = COALESCE($12, is_active),
                        updated_at     = $13
                     WHERE goal_id = $1
                     RETURNING ",
                    goal_columns!()
                ))
                .bind(goal_id)
                .bind(req.name.as_deref().map(str::trim))
                .bind(req.description.as_deref())
                .bind(req.goal_type.map(GoalType::as_str))
                .bind(req.target_value)
                .bind(req.start_date)
                .bind(req.end_date)
                .bind(req.frequency.map(GoalFrequency::as_str))
                .bind(req.difficulty.map(GoalDifficulty::as_str))
                .bind(req.dentist_id)
                .bind(req.procedure_type.as_deref())
                .bind(req.is_active)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn record_goal_progress(
                &self,
                goal_id: Uuid,
                progress: GoalProgress,
            ) -> StoreResult<Option<FinancialGoalRow>> {
                // The is_completed guard keeps completion monotonic even under racing writers.
                let row = sqlx::query_as::<_, FinancialGoalRow>(concat!(
                    "UPDATE financial_goal SET
                        current_value = $2,
                        is_completed  = $3,
                        completed_at  = $4,
                        updated_at    = $5
                     WHERE goal_id = $1
                       AND is_completed = FALSE
                     RETURNING ",
                    goal_columns!()
                ))
                .bind(goal_id)
                .bind(progress.current_value)
                .bind(progress.completed_at.is_some())
                .bind(progress.completed_at)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn delete_goal(&self, goal_id: Uuid) -> StoreResult<bool> {
                let res = sqlx::query("DELETE FROM financial_goal WHERE goal_id = $1")
                    .bind(goal_id)
                    .execute(&self.pool)
                    .await?;
                Ok(res.rows_affected() > 0)
            }

            /* ---------------- achievements ---------------- */

            async fn create_achievement(&self, req: &CreateAchievementRequest) -> StoreResult<AchievementRow> {
                let row = sqlx::query_as::<_, AchievementRow>(concat!(
                    "INSERT INTO achievement (",
                    achievement_columns!(),
                    ") VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
                    achievement_columns!()
                ))
                .bind(Uuid::new_v4())
                .bind(req.name.trim())
                .bind(req.description.as_deref())
                .bind(req.point_value)
                .bind(req.achievement_type.trim())
                .bind(req.image_url.as_deref())
                .bind(Utc::now())
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn list_achievements(&self) -> StoreResult<Vec<AchievementRow>> {
                let rows = sqlx::query_as::<_, AchievementRow>(concat!(
                    "SELECT ",
                    achievement_columns!(),
                    " FROM achievement ORDER BY point_value ASC, name ASC"
                ))
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }

            async fn get_achievement(&self, achievement_id: Uuid) -> StoreResult<Option<AchievementRow>> {
                let row = sqlx::query_as::<_, AchievementRow>(concat!(
                    "SELECT ",
                    achievement_columns!(),
                    " FROM achievement WHERE achievement_id = $1"
                ))
                .bind(achievement_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn find_award(&self, achievement_id: Uuid) -> StoreResult<Option<UserAchievementRow>> {
                let row = sqlx::query_as::<_, UserAchievementRow>(
                    r#"
                    SELECT user_achievement_id, achievement_id, earned_date
                    FROM user_achievement
                    WHERE achievement_id = $1
                    "#,
                )
                .bind(achievement_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(row)
            }

            async fn insert_award(
                &self,
                achievement_id: Uuid,
                earned_date: DateTime<Utc>,
            ) -> StoreResult<UserAchievementRow> {
                let row = sqlx::query_as::<_, UserAchievementRow>(
                    r#"
                    INSERT INTO user_achievement (user_achievement_id, achievement_id, earned_date)
                    VALUES ($1, $2, $3)
                    RETURNING user_achievement_id, achievement_id, earned_date
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(achievement_id)
                .bind(earned_date)
                .fetch_one(&self.pool)
                .await?;
                Ok(row)
            }

            async fn count_awards(&self, achievement_id: Uuid) -> StoreResult<i64> {
                let n: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM user_achievement WHERE achievement_id = $1",
                )
                .bind(achievement_id)
                .fetch_one(&self.pool)
                .await?;
                Ok(n)
            }

            async fn list_earned_achievements(&self) -> StoreResult<Vec<EarnedAchievementRow>> {
                let rows = sqlx::query_as::<_, EarnedAchievementRow>(
                    r#"
                    SELECT
                      ua.user_achievement_id,
                      ua.achievement_id,
                      ua.earned_date,
                      a.name,
                      a.description,
                      a.point_value,
                      a.achievement_type,
                      a.image_url
                    FROM user_achievement ua
                    JOIN achievement a ON a.achievement_id = ua.achievement_id
                    ORDER BY ua.earned_date DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?;
                Ok(rows)
            }
        }
    };
}
