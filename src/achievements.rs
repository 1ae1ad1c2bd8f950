//! One-time achievement awards for the practice's single implicit user.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::UserAchievementRow;
use crate::repository::{Repository, StoreError};

#[derive(Debug)]
pub enum AwardOutcome {
    Awarded(UserAchievementRow),
    AlreadyAwarded,
    UnknownAchievement,
}

impl AwardOutcome {
    /// `true` only when this call created the award record.
    pub fn is_awarded(&self) -> bool {
        matches!(self, AwardOutcome::Awarded(_))
    }
}

/// Grants `achievement_id` at most once, stamped with `now`.
pub async fn award_achievement(
    repo: &dyn Repository,
    achievement_id: Uuid,
    now: DateTime<Utc>,
) -> Result<AwardOutcome, StoreError> {
    if repo.get_achievement(achievement_id).await?.is_none() {
        return Ok(AwardOutcome::UnknownAchievement);
    }
    if repo.find_award(achievement_id).await?.is_some() {
        return Ok(AwardOutcome::AlreadyAwarded);
    }

    match repo.insert_award(achievement_id, now).await {
        Ok(row) => {
            tracing::info!(%achievement_id, "achievement awarded");
            Ok(AwardOutcome::Awarded(row))
        }
        // unique(achievement_id) caught a concurrent award
        Err(StoreError::Conflict(_)) => Ok(AwardOutcome::AlreadyAwarded),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn awarding_twice_creates_one_record() {
        let repo = memory_repo().await;
        let first_case = seed_achievement(&repo, "First Case", 10).await;

        let first = award_achievement(&repo, first_case.achievement_id, Utc::now()).await.unwrap();
        assert!(first.is_awarded());

        let second = award_achievement(&repo, first_case.achievement_id, Utc::now()).await.unwrap();
        assert!(!second.is_awarded());
        assert!(matches!(second, AwardOutcome::AlreadyAwarded));

        assert_eq!(repo.count_awards(first_case.achievement_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_achievement_is_not_awarded() {
        let repo = memory_repo().await;
        let outcome = award_achievement(&repo, Uuid::new_v4(), Utc::now()).await.unwrap();
        assert!(matches!(outcome, AwardOutcome::UnknownAchievement));
        assert!(!outcome.is_awarded());
    }

    #[tokio::test]
    async fn storage_rejects_duplicate_award_rows() {
        let repo = memory_repo().await;
        let a = seed_achievement(&repo, "Hundred Canals", 50).await;
        repo.insert_award(a.achievement_id, Utc::now()).await.unwrap();

        let err = repo.insert_award(a.achievement_id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn earned_list_joins_achievement_details() {
        let repo = memory_repo().await;
        let a = seed_achievement(&repo, "Hundred Canals", 50).await;
        seed_achievement(&repo, "Unearned", 5).await;
        award_achievement(&repo, a.achievement_id, Utc::now()).await.unwrap();

        let earned = repo.list_earned_achievements().await.unwrap();
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].name, "Hundred Canals");
        assert_eq!(earned[0].point_value, 50);
    }
}
