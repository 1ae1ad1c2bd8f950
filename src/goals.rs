//! Financial-goal progress: batch re-evaluation and the manual override path.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::metrics::{self, MetricWindow};
use crate::models::{FinancialGoalRow, GoalType};
use crate::repository::{GoalProgress, Repository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("goal not found")]
    NotFound,
    #[error("unknown goal type {0:?}")]
    UnknownGoalType(String),
    #[error("goal window ends ({end}) before it starts ({start})")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of one `check_goals_progress` pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub updated_goals: u32,
    pub completed_goals: u32,
}

/// The write that moving a goal to `value` implies. Completion is only ever
/// set here, and only for a goal that is not completed yet.
pub fn progress_for(goal: &FinancialGoalRow, value: f64, now: DateTime<Utc>) -> GoalProgress {
    GoalProgress {
        current_value: value,
        completed_at: (value >= goal.target_value).then_some(now),
    }
}

/// Recomputes every active, not-yet-completed goal from live data.
///
/// Goals missing their mandatory filter are skipped. A failure on one goal
/// is logged and the pass moves on; only failing to list goals aborts.
pub async fn check_goals_progress(
    repo: &dyn Repository,
    now: DateTime<Utc>,
) -> Result<ProgressReport, StoreError> {
    let goals = repo.list_goals_pending_evaluation().await?;
    let mut report = ProgressReport::default();

    for goal in &goals {
        let value = match evaluate_goal(repo, goal).await {
            Ok(Some(v)) => v,
            Ok(None) => {
                tracing::warn!(
                    goal_id = %goal.goal_id,
                    goal_type = %goal.goal_type,
                    "skipping goal without its required filter"
                );
                continue;
            }
            Err(e) => {
                tracing::warn!(goal_id = %goal.goal_id, error = %e, "goal evaluation failed");
                continue;
            }
        };

        if value == goal.current_value {
            continue;
        }

        let progress = progress_for(goal, value, now);
        match repo.record_goal_progress(goal.goal_id, progress).await {
            Ok(Some(saved)) => {
                report.updated_goals += 1;
                if saved.is_completed {
                    report.completed_goals += 1;
                    tracing::info!(goal_id = %saved.goal_id, name = %saved.name, "goal completed");
                } else {
                    tracing::debug!(goal_id = %saved.goal_id, value, "goal progress updated");
                }
            }
            // Completed concurrently since we listed it.
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(goal_id = %goal.goal_id, error = %e, "could not persist goal progress");
            }
        }
    }

    tracing::info!(
        evaluated = goals.len(),
        updated = report.updated_goals,
        completed = report.completed_goals,
        "goal progress check finished"
    );
    Ok(report)
}

/// Current metric for `goal`, or `None` when a SPECIFIC_* goal lacks its filter.
pub async fn evaluate_goal(
    repo: &dyn Repository,
    goal: &FinancialGoalRow,
) -> Result<Option<f64>, GoalError> {
    let goal_type: GoalType = goal
        .goal_type
        .parse()
        .map_err(GoalError::UnknownGoalType)?;

    // An inverted window matches nothing, so every metric over it is 0.
    let window = MetricWindow::new(goal.start_date, goal.end_date);

    let value = match goal_type {
        GoalType::Revenue => {
            let procedures = repo.list_procedures_between(goal.start_date, goal.end_date).await?;
            let window = window
                .with_dentist(goal.dentist_id)
                .with_procedure_type(goal.procedure_type.as_deref());
            metrics::revenue(&procedures, &window)
        }
        GoalType::ProcedureCount => {
            let procedures = repo.list_procedures_between(goal.start_date, goal.end_date).await?;
            let window = window
                .with_dentist(goal.dentist_id)
                .with_procedure_type(goal.procedure_type.as_deref());
            metrics::procedure_count(&procedures, &window)
        }
        GoalType::NewPatients => {
            let (from, to) = day_bounds(goal.start_date, goal.end_date);
            let patients = repo.list_patients_created_between(from, to).await?;
            metrics::new_patients(&patients, &window)
        }
        GoalType::SpecificDentist => {
            let Some(dentist_id) = goal.dentist_id else {
                return Ok(None);
            };
            let procedures = repo.list_procedures_between(goal.start_date, goal.end_date).await?;
            let window = window.with_procedure_type(goal.procedure_type.as_deref());
            metrics::dentist_revenue(&procedures, &window, dentist_id)
        }
        GoalType::SpecificProcedure => {
            let Some(procedure_type) = goal.procedure_type.as_deref() else {
                return Ok(None);
            };
            let procedures = repo.list_procedures_between(goal.start_date, goal.end_date).await?;
            let window = window.with_dentist(goal.dentist_id);
            metrics::procedure_type_count(&procedures, &window, procedure_type)
        }
    };

    Ok(Some(value))
}

/// Manual override with an absolute value. Completed goals come back unchanged.
pub async fn update_goal_progress(
    repo: &dyn Repository,
    goal_id: Uuid,
    value: f64,
    now: DateTime<Utc>,
) -> Result<FinancialGoalRow, GoalError> {
    let goal = repo.get_goal(goal_id).await?.ok_or(GoalError::NotFound)?;
    if goal.is_completed {
        return Ok(goal);
    }

    match repo
        .record_goal_progress(goal_id, progress_for(&goal, value, now))
        .await?
    {
        Some(saved) => Ok(saved),
        // Lost a race with a completing write; report what is stored now.
        None => repo.get_goal(goal_id).await?.ok_or(GoalError::NotFound),
    }
}

/// UTC instants covering whole days `[start, end]`, as a half-open range.
fn day_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = Utc.from_utc_datetime(&start.and_time(chrono::NaiveTime::MIN));
    let after_end = end.checked_add_days(Days::new(1)).unwrap_or(end);
    let to = Utc.from_utc_datetime(&after_end.and_time(chrono::NaiveTime::MIN));
    (from, to)
}
