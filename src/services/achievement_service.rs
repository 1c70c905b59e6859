use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::achievements::{ACHIEVEMENT_CATALOG, HabitMetrics, catalog_index, plan_sync};
use crate::models::achievement::Achievement;
use crate::repositories::RepositoryError;
use crate::repositories::achievement_repository::AchievementRepository;
use crate::repositories::habit_repository::HabitRepository;

/// Achievement service errors
#[derive(Debug, thiserror::Error)]
pub enum AchievementError {
    #[error("Achievement not found")]
    AchievementNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for AchievementError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => AchievementError::AchievementNotFound,
            RepositoryError::DatabaseError(msg) => AchievementError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => AchievementError::DatabaseError(msg),
        }
    }
}

/// A store failure for one achievement during a sync pass; the rest of
/// the batch proceeds regardless
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncFailure {
    pub achievement_id: Uuid,
    pub error: String,
}

/// Result of one synchronization pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SyncOutcome {
    /// True when another sync for the same user was already in flight
    pub skipped: bool,
    /// Achievements whose progress counter was written
    pub updated: Vec<Uuid>,
    /// Achievements that transitioned to unlocked
    pub unlocked: Vec<Uuid>,
    pub failures: Vec<SyncFailure>,
}

impl SyncOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

/// Trait defining achievement service operations
#[async_trait]
pub trait AchievementService: Send + Sync {
    /// Get the user's achievement catalog, seeding it first if empty
    async fn list(&self, user_id: Uuid) -> Result<Vec<Achievement>, AchievementError>;

    /// Seed the fixed catalog for a user; a no-op if any rows exist
    async fn seed(&self, user_id: Uuid) -> Result<(), AchievementError>;

    /// Recompute progress from the current habit snapshot and persist
    /// only the deltas
    async fn sync(&self, user_id: Uuid) -> Result<SyncOutcome, AchievementError>;
}

/// Implementation of AchievementService
pub struct AchievementServiceImpl {
    achievement_repository: Arc<dyn AchievementRepository>,
    habit_repository: Arc<dyn HabitRepository>,
    /// Users with a sync currently outstanding
    in_flight: Mutex<HashSet<Uuid>>,
}

impl AchievementServiceImpl {
    pub fn new(
        achievement_repository: Arc<dyn AchievementRepository>,
        habit_repository: Arc<dyn HabitRepository>,
    ) -> Self {
        Self {
            achievement_repository,
            habit_repository,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn catalog_for_user(user_id: Uuid) -> Vec<Achievement> {
        ACHIEVEMENT_CATALOG
            .iter()
            .map(|entry| Achievement {
                id: Uuid::new_v4(),
                user_id,
                achievement_type: entry.achievement_type,
                name: entry.name.to_string(),
                description: entry.description.to_string(),
                icon: entry.icon.to_string(),
                progress: 0,
                target: entry.target,
                unlocked: false,
                unlocked_at: None,
                xp: entry.xp,
            })
            .collect()
    }

    async fn run_sync(&self, user_id: Uuid) -> Result<SyncOutcome, AchievementError> {
        let habits = self.habit_repository.find_by_user(user_id).await?;
        let mut achievements = self.achievement_repository.find_by_user(user_id).await?;
        if habits.is_empty() || achievements.is_empty() {
            return Ok(SyncOutcome::default());
        }

        // Catalog order keeps the pass reproducible
        achievements.sort_by_key(|a| catalog_index(a.achievement_type));

        let today = Utc::now().date_naive();
        let metrics = HabitMetrics::compute(&habits, today);
        let plan = plan_sync(&achievements, &metrics);

        let mut outcome = SyncOutcome::default();
        for update in plan {
            if update.progress_changed {
                match self
                    .achievement_repository
                    .update_progress(user_id, update.achievement_id, update.progress)
                    .await
                {
                    Ok(_) => outcome.updated.push(update.achievement_id),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to persist progress for achievement {}: {}",
                            update.achievement_id,
                            e
                        );
                        outcome.failures.push(SyncFailure {
                            achievement_id: update.achievement_id,
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
            }
            if update.unlock {
                match self
                    .achievement_repository
                    .unlock(user_id, update.achievement_id, Utc::now())
                    .await
                {
                    Ok(_) => outcome.unlocked.push(update.achievement_id),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to unlock achievement {}: {}",
                            update.achievement_id,
                            e
                        );
                        outcome.failures.push(SyncFailure {
                            achievement_id: update.achievement_id,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
        Ok(outcome)
    }
}

#[async_trait]
impl AchievementService for AchievementServiceImpl {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Achievement>, AchievementError> {
        let mut achievements = self.achievement_repository.find_by_user(user_id).await?;
        if achievements.is_empty() {
            self.seed(user_id).await?;
            achievements = self.achievement_repository.find_by_user(user_id).await?;
        }
        achievements.sort_by_key(|a| catalog_index(a.achievement_type));
        Ok(achievements)
    }

    async fn seed(&self, user_id: Uuid) -> Result<(), AchievementError> {
        let existing = self.achievement_repository.find_by_user(user_id).await?;
        if !existing.is_empty() {
            return Ok(());
        }
        self.achievement_repository
            .insert_many(Self::catalog_for_user(user_id))
            .await?;
        Ok(())
    }

    async fn sync(&self, user_id: Uuid) -> Result<SyncOutcome, AchievementError> {
        if !self.in_flight.lock().unwrap().insert(user_id) {
            return Ok(SyncOutcome::skipped());
        }
        let result = self.run_sync(user_id).await;
        self.in_flight.lock().unwrap().remove(&user_id);
        result
    }
}
