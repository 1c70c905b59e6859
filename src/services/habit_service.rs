use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::DEFAULT_CATEGORY_NAME;
use crate::models::habit::{CreateHabitRequest, Frequency, Habit, UpdateHabitRequest};
use crate::recurrence::{streak_for_habit, weekday_abbrev};
use crate::repositories::RepositoryError;
use crate::repositories::habit_repository::HabitRepository;
use crate::services::achievement_service::AchievementService;
use crate::subscriptions::SnapshotHub;
use crate::validation::WEEKDAY_ABBREVS;

/// Habit service errors
#[derive(Debug, thiserror::Error)]
pub enum HabitError {
    #[error("Title must not be empty")]
    InvalidTitle,

    #[error("Habit not found")]
    HabitNotFound,

    #[error("Unauthorized to access this habit")]
    Forbidden,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for HabitError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => HabitError::HabitNotFound,
            RepositoryError::DatabaseError(msg) => HabitError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => HabitError::DatabaseError(msg),
        }
    }
}

/// Trait defining habit service operations
#[async_trait]
pub trait HabitService: Send + Sync {
    /// Create a new habit
    async fn create_habit(
        &self,
        user_id: Uuid,
        request: CreateHabitRequest,
    ) -> Result<Habit, HabitError>;

    /// Get all habits for a user, newest first
    async fn get_habits(&self, user_id: Uuid) -> Result<Vec<Habit>, HabitError>;

    /// Update an existing habit's fields
    async fn update_habit(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        request: UpdateHabitRequest,
    ) -> Result<Habit, HabitError>;

    /// Delete a habit
    async fn delete_habit(&self, user_id: Uuid, habit_id: Uuid) -> Result<(), HabitError>;

    /// Toggle a completion date on a habit, recomputing its streaks
    async fn toggle_completion(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Habit, HabitError>;
}

/// Implementation of HabitService
pub struct HabitServiceImpl {
    habit_repository: Arc<dyn HabitRepository>,
    achievement_service: Arc<dyn AchievementService>,
    habit_hub: Arc<SnapshotHub<Habit>>,
}

impl HabitServiceImpl {
    pub fn new(
        habit_repository: Arc<dyn HabitRepository>,
        achievement_service: Arc<dyn AchievementService>,
        habit_hub: Arc<SnapshotHub<Habit>>,
    ) -> Self {
        Self {
            habit_repository,
            achievement_service,
            habit_hub,
        }
    }

    /// Normalize the selected-day set for a frequency, substituting the
    /// documented default when the request leaves it empty: the start
    /// date's weekday for weekly habits, its day-of-month for monthly.
    /// Persisted habits therefore always carry at least one selected day.
    fn normalize_selected_days(
        frequency: Frequency,
        start_date: NaiveDate,
        requested: Option<Vec<String>>,
    ) -> Vec<String> {
        match frequency {
            Frequency::Daily => Vec::new(),
            Frequency::Weekly => {
                let mut days: Vec<String> = requested
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|d| WEEKDAY_ABBREVS.contains(&d.as_str()))
                    .collect();
                days.dedup();
                if days.is_empty() {
                    days.push(weekday_abbrev(start_date).to_string());
                }
                days
            }
            Frequency::Monthly => {
                let mut days: Vec<String> = requested
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|d| {
                        d.parse::<u32>()
                            .map(|n| (1..=31).contains(&n))
                            .unwrap_or(false)
                    })
                    .collect();
                days.dedup();
                if days.is_empty() {
                    days.push(start_date.day().to_string());
                }
                days
            }
        }
    }

    /// Publish the user's fresh habit collection to snapshot subscribers
    /// and re-derive achievement progress. Both are best-effort: the
    /// mutation that triggered them has already been persisted.
    async fn after_mutation(&self, user_id: Uuid) {
        match self.habit_repository.find_by_user(user_id).await {
            Ok(habits) => self.habit_hub.publish(user_id, habits),
            Err(e) => tracing::warn!("Failed to publish habit snapshot for {}: {}", user_id, e),
        }
        if let Err(e) = self.achievement_service.sync(user_id).await {
            tracing::warn!("Achievement sync failed after habit change: {}", e);
        }
    }

    async fn find_owned(&self, user_id: Uuid, habit_id: Uuid) -> Result<Habit, HabitError> {
        let habit = self
            .habit_repository
            .find_by_id(habit_id)
            .await?
            .ok_or(HabitError::HabitNotFound)?;
        if habit.user_id != user_id {
            return Err(HabitError::Forbidden);
        }
        Ok(habit)
    }
}

#[async_trait]
impl HabitService for HabitServiceImpl {
    async fn create_habit(
        &self,
        user_id: Uuid,
        request: CreateHabitRequest,
    ) -> Result<Habit, HabitError> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(HabitError::InvalidTitle);
        }

        let start_date = request.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let selected_days =
            Self::normalize_selected_days(request.frequency, start_date, request.selected_days);
        let category = request
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_string());

        let habit = Habit {
            id: Uuid::new_v4(),
            user_id,
            title,
            category,
            frequency: request.frequency,
            selected_days,
            start_date,
            completed_dates: Vec::new(),
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            enable_reminder: request.enable_reminder.unwrap_or(false),
            created_at: Utc::now(),
        };

        let habit = self.habit_repository.create(habit).await?;
        self.after_mutation(user_id).await;
        Ok(habit)
    }

    async fn get_habits(&self, user_id: Uuid) -> Result<Vec<Habit>, HabitError> {
        Ok(self.habit_repository.find_by_user(user_id).await?)
    }

    async fn update_habit(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        request: UpdateHabitRequest,
    ) -> Result<Habit, HabitError> {
        let existing = self.find_owned(user_id, habit_id).await?;

        let title = match request.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(HabitError::InvalidTitle);
                }
                title
            }
            None => existing.title,
        };

        let frequency = request.frequency.unwrap_or(existing.frequency);
        let start_date = request.start_date.unwrap_or(existing.start_date);
        // Re-apply defaults whenever recurrence fields change; an
        // untouched rule keeps its stored day set
        let selected_days = if request.frequency.is_some()
            || request.start_date.is_some()
            || request.selected_days.is_some()
        {
            Self::normalize_selected_days(
                frequency,
                start_date,
                request.selected_days.or(Some(existing.selected_days)),
            )
        } else {
            existing.selected_days
        };

        let updated = Habit {
            id: habit_id,
            user_id,
            title,
            category: request.category.unwrap_or(existing.category),
            frequency,
            selected_days,
            start_date,
            completed_dates: existing.completed_dates,
            current_streak: existing.current_streak,
            best_streak: existing.best_streak,
            total_completions: existing.total_completions,
            enable_reminder: request.enable_reminder.unwrap_or(existing.enable_reminder),
            created_at: existing.created_at,
        };

        let habit = self.habit_repository.update(updated).await?;
        self.after_mutation(user_id).await;
        Ok(habit)
    }

    async fn delete_habit(&self, user_id: Uuid, habit_id: Uuid) -> Result<(), HabitError> {
        self.find_owned(user_id, habit_id).await?;
        self.habit_repository.delete(habit_id).await?;
        self.after_mutation(user_id).await;
        Ok(())
    }

    async fn toggle_completion(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Habit, HabitError> {
        let mut habit = self.find_owned(user_id, habit_id).await?;
        let today = Utc::now().date_naive();
        let date = date.unwrap_or(today);

        if habit.completed_dates.contains(&date) {
            habit.completed_dates.retain(|d| *d != date);
        } else {
            habit.completed_dates.push(date);
        }
        habit.completed_dates.sort();
        habit.completed_dates.dedup();
        habit.total_completions = habit.completed_dates.len() as i32;

        // Full recompute instead of a ±1 delta: correct even when a
        // non-adjacent past date was un-completed
        habit.current_streak = streak_for_habit(&habit, today);
        habit.best_streak = habit.best_streak.max(habit.current_streak);

        let habit = self.habit_repository.update(habit).await?;
        self.after_mutation(user_id).await;
        Ok(habit)
    }
}
