use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::inventory::is_low_stock;
use crate::models::{AppointmentRow, InvoiceRow, ProcedureFilter, ProcedureRow};
use crate::models::{AppointmentStatus, InvoiceStatus, PaymentStatus};
use crate::repository::{Repository, StoreError};

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: i64,
    pub total_dentists: i64,
    pub total_procedures: i64,
    pub total_revenue: f64,
    pub pending_payments: f64,
    pub open_invoices: i64,
    pub open_invoice_amount: f64,
    pub upcoming_appointments: i64,
    pub low_stock_materials: i64,
    pub active_goals: i64,
    pub completed_goals: i64,
    pub earned_achievements: i64,
    pub earned_points: i64,
}

fn procedure_totals(procedures: &[ProcedureRow]) -> (f64, f64) {
    procedures.iter().fold((0.0, 0.0), |(revenue, pending), p| {
        let unpaid = if p.payment_status == PaymentStatus::Paid.as_str() {
            0.0
        } else {
            p.value
        };
        (revenue + p.value, pending + unpaid)
    })
}

fn open_invoices(invoices: &[InvoiceRow]) -> (i64, f64) {
    invoices
        .iter()
        .filter(|i| {
            i.status == InvoiceStatus::Pending.as_str() || i.status == InvoiceStatus::Overdue.as_str()
        })
        .fold((0, 0.0), |(n, amount), i| (n + 1, amount + i.amount))
}

fn upcoming(appointments: &[AppointmentRow], now: DateTime<Utc>) -> i64 {
    appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Scheduled.as_str() && a.scheduled_at >= now)
        .count() as i64
}

/// Practice-wide totals for the dashboard landing page.
pub async fn collect_stats(repo: &dyn Repository, now: DateTime<Utc>) -> Result<DashboardStats, StoreError> {
    let procedures = repo.list_procedures(&ProcedureFilter::default()).await?;
    let invoices = repo.list_invoices(None).await?;
    let appointments = repo.list_appointments(Some(now), None).await?;
    let materials = repo.list_materials().await?;
    let goals = repo.list_goals().await?;
    let earned = repo.list_earned_achievements().await?;

    let (total_revenue, pending_payments) = procedure_totals(&procedures);
    let (open_count, open_amount) = open_invoices(&invoices);

    Ok(DashboardStats {
        total_patients: repo.count_patients().await?,
        total_dentists: repo.count_dentists().await?,
        total_procedures: procedures.len() as i64,
        total_revenue,
        pending_payments,
        open_invoices: open_count,
        open_invoice_amount: open_amount,
        upcoming_appointments: upcoming(&appointments, now),
        low_stock_materials: materials.iter().filter(|m| is_low_stock(m)).count() as i64,
        active_goals: goals.iter().filter(|g| g.is_active && !g.is_completed).count() as i64,
        completed_goals: goals.iter().filter(|g| g.is_completed).count() as i64,
        earned_achievements: earned.len() as i64,
        earned_points: earned.iter().map(|e| e.point_value).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use crate::test_support::*;
    use chrono::{Duration, NaiveDate};

    #[tokio::test]
    async fn stats_summarise_the_practice() {
        let repo = memory_repo().await;
        let now = Utc::now();
        let patient = seed_patient(&repo, "Ana").await;
        seed_dentist(&repo, "Dr. Costa").await;
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let paid = seed_procedure(&repo, patient.patient_id, None, "TREATMENT", 800.0, day).await;
        repo.update_payment_status(paid.procedure_id, PaymentStatus::Paid).await.unwrap();
        seed_procedure(&repo, patient.patient_id, None, "RETREATMENT", 450.0, day).await;

        repo.create_invoice(&CreateInvoiceRequest {
            patient_id: patient.patient_id,
            procedure_id: None,
            amount: 450.0,
            issue_date: day,
            due_date: None,
            status: None,
            notes: None,
        })
        .await
        .unwrap();

        repo.create_appointment(
            &CreateAppointmentRequest {
                patient_id: patient.patient_id,
                dentist_id: None,
                scheduled_at: now + Duration::days(2),
                duration_minutes: None,
                procedure_type: None,
                notes: None,
            },
            60,
        )
        .await
        .unwrap();

        seed_material(&repo, "Sealer", 5.0, 1, Some(4)).await;
        let badge = seed_achievement(&repo, "First Case", 10).await;
        repo.insert_award(badge.achievement_id, now).await.unwrap();

        let stats = collect_stats(&repo, now).await.unwrap();
        assert_eq!(stats.total_patients, 1);
        assert_eq!(stats.total_dentists, 1);
        assert_eq!(stats.total_procedures, 2);
        assert_eq!(stats.total_revenue, 1250.0);
        assert_eq!(stats.pending_payments, 450.0);
        assert_eq!(stats.open_invoices, 1);
        assert_eq!(stats.open_invoice_amount, 450.0);
        assert_eq!(stats.upcoming_appointments, 1);
        assert_eq!(stats.low_stock_materials, 1);
        assert_eq!(stats.earned_points, 10);
    }

    #[tokio::test]
    async fn empty_practice_has_zero_stats() {
        let repo = memory_repo().await;
        let stats = collect_stats(&repo, Utc::now()).await.unwrap();
        assert_eq!(stats, DashboardStats::default());
    }
}
