//! Goal metrics computed over an in-memory snapshot of procedures or patients.
//!
//! Every function here is pure: same rows in, same number out. An empty
//! window or no matching rows yields `0.0`.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{PatientRow, ProcedureRow};

/// Inclusive date window plus the optional procedure filters a goal carries.
#[derive(Debug, Clone, Copy)]
pub struct MetricWindow<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dentist_id: Option<Uuid>,
    pub procedure_type: Option<&'a str>,
}

impl<'a> MetricWindow<'a> {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            dentist_id: None,
            procedure_type: None,
        }
    }

    pub fn with_dentist(mut self, dentist_id: Option<Uuid>) -> Self {
        self.dentist_id = dentist_id;
        self
    }

    pub fn with_procedure_type(mut self, procedure_type: Option<&'a str>) -> Self {
        self.procedure_type = procedure_type;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn matches(&self, p: &ProcedureRow) -> bool {
        self.contains(p.procedure_date)
            && self.dentist_id.is_none_or(|d| p.dentist_id == Some(d))
            && self.procedure_type.is_none_or(|t| p.procedure_type == t)
    }
}

/// Sum of `value` over matching procedures.
pub fn revenue(procedures: &[ProcedureRow], window: &MetricWindow<'_>) -> f64 {
    procedures
        .iter()
        .filter(|p| window.matches(p))
        .map(|p| p.value)
        .sum()
}

/// Number of matching procedures.
pub fn procedure_count(procedures: &[ProcedureRow], window: &MetricWindow<'_>) -> f64 {
    procedures.iter().filter(|p| window.matches(p)).count() as f64
}

/// Patients whose `created_at` falls on a day inside the window.
/// Procedure filters on the window are ignored.
pub fn new_patients(patients: &[PatientRow], window: &MetricWindow<'_>) -> f64 {
    patients
        .iter()
        .filter(|p| window.contains(p.created_at.date_naive()))
        .count() as f64
}

/// Revenue attributed to one referring dentist.
pub fn dentist_revenue(
    procedures: &[ProcedureRow],
    window: &MetricWindow<'_>,
    dentist_id: Uuid,
) -> f64 {
    revenue(procedures, &window.with_dentist(Some(dentist_id)))
}

/// Count of one procedure type.
pub fn procedure_type_count(
    procedures: &[ProcedureRow],
    window: &MetricWindow<'_>,
    procedure_type: &str,
) -> f64 {
    procedure_count(procedures, &window.with_procedure_type(Some(procedure_type)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn procedure(value: f64, on: NaiveDate, dentist: Option<Uuid>, kind: &str) -> ProcedureRow {
        ProcedureRow {
            procedure_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            dentist_id: dentist,
            procedure_type: kind.to_string(),
            tooth_number: None,
            value,
            procedure_date: on,
            payment_status: "PENDING".into(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn patient_created(y: i32, m: u32, d: u32, h: u32) -> PatientRow {
        let at = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        PatientRow {
            patient_id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: None,
            phone: None,
            birth_date: None,
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let rows = vec![
            procedure(100.0, date(2023, 12, 31), None, "TREATMENT"),
            procedure(200.0, date(2024, 1, 1), None, "TREATMENT"),
            procedure(300.0, date(2024, 1, 31), None, "RETREATMENT"),
            procedure(400.0, date(2024, 2, 1), None, "TREATMENT"),
        ];
        let window = MetricWindow::new(date(2024, 1, 1), date(2024, 1, 31));

        assert_eq!(revenue(&rows, &window), 500.0);
        assert_eq!(procedure_count(&rows, &window), 2.0);
    }

    #[test]
    fn filters_narrow_revenue_and_counts() {
        let dr_a = Uuid::new_v4();
        let dr_b = Uuid::new_v4();
        let rows = vec![
            procedure(600.0, date(2024, 1, 10), Some(dr_a), "TREATMENT"),
            procedure(500.0, date(2024, 1, 12), Some(dr_b), "TREATMENT"),
            procedure(250.0, date(2024, 1, 15), Some(dr_a), "APICOECTOMY"),
            procedure(90.0, date(2024, 1, 20), None, "TREATMENT"),
        ];
        let window = MetricWindow::new(date(2024, 1, 1), date(2024, 1, 31));

        assert_eq!(dentist_revenue(&rows, &window, dr_a), 850.0);
        assert_eq!(procedure_type_count(&rows, &window, "TREATMENT"), 3.0);
        let both = window.with_dentist(Some(dr_a)).with_procedure_type(Some("TREATMENT"));
        assert_eq!(revenue(&rows, &both), 600.0);
    }

    #[test]
    fn new_patients_counts_by_creation_day() {
        let rows = vec![
            patient_created(2023, 12, 31, 23),
            patient_created(2024, 1, 1, 0),
            patient_created(2024, 1, 31, 23),
            patient_created(2024, 2, 1, 0),
        ];
        let window = MetricWindow::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(new_patients(&rows, &window), 2.0);
    }

    #[test]
    fn empty_inputs_yield_zero() {
        let window = MetricWindow::new(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(revenue(&[], &window), 0.0);
        assert_eq!(procedure_count(&[], &window), 0.0);
        assert_eq!(new_patients(&[], &window), 0.0);

        let inverted = MetricWindow::new(date(2024, 2, 1), date(2024, 1, 1));
        let rows = vec![procedure(100.0, date(2024, 1, 15), None, "TREATMENT")];
        assert_eq!(revenue(&rows, &inverted), 0.0);
    }
}
