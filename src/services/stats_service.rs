use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::stats::{StatsOverview, TimeRange};
use crate::repositories::RepositoryError;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::habit_repository::HabitRepository;
use crate::stats::{
    best_and_worst_habits, completion_rate, current_streak, daily_completion_series,
    stats_by_category,
};

/// Statistics service errors
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Unknown range '{0}', expected one of 7days, 30days, 90days, all")]
    InvalidRange(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for StatsError {
    fn from(error: RepositoryError) -> Self {
        StatsError::DatabaseError(error.to_string())
    }
}

/// Trait defining statistics service operations
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Assemble the full statistics overview for one time range
    async fn get_overview(
        &self,
        user_id: Uuid,
        range_param: Option<String>,
    ) -> Result<StatsOverview, StatsError>;
}

/// Implementation of StatsService
///
/// All derivation happens in the pure engine over one snapshot fetch;
/// this layer only resolves "today" and the requested range.
pub struct StatsServiceImpl {
    habit_repository: Arc<dyn HabitRepository>,
    category_repository: Arc<dyn CategoryRepository>,
}

impl StatsServiceImpl {
    pub fn new(
        habit_repository: Arc<dyn HabitRepository>,
        category_repository: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            habit_repository,
            category_repository,
        }
    }
}

#[async_trait]
impl StatsService for StatsServiceImpl {
    async fn get_overview(
        &self,
        user_id: Uuid,
        range_param: Option<String>,
    ) -> Result<StatsOverview, StatsError> {
        let range = match range_param {
            Some(param) => {
                TimeRange::from_param(&param).ok_or(StatsError::InvalidRange(param))?
            }
            None => TimeRange::Last7Days,
        };

        let habits = self.habit_repository.find_by_user(user_id).await?;
        let categories = self.category_repository.find_by_user(user_id).await?;
        let today = Utc::now().date_naive();

        let rankings = best_and_worst_habits(&habits, range, today);

        Ok(StatsOverview {
            range,
            completion_rate: completion_rate(&habits, range, today),
            current_streak: current_streak(&habits, today),
            categories: stats_by_category(&habits, &categories, range, today),
            daily: daily_completion_series(&habits, range, today),
            best_habits: rankings.best,
            worst_habits: rankings.worst,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::Category;
    use crate::models::habit::{Frequency, Habit};
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct MockHabitRepository {
        habits: Mutex<Vec<Habit>>,
    }

    #[async_trait]
    impl HabitRepository for MockHabitRepository {
        async fn create(&self, habit: Habit) -> Result<Habit, RepositoryError> {
            self.habits.lock().unwrap().push(habit.clone());
            Ok(habit)
        }

        async fn update(&self, habit: Habit) -> Result<Habit, RepositoryError> {
            Ok(habit)
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Habit>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Habit>, RepositoryError> {
            Ok(self
                .habits
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn reassign_category(
            &self,
            _user_id: Uuid,
            _from: &str,
            _to: &str,
        ) -> Result<u64, RepositoryError> {
            Ok(0)
        }
    }

    struct MockCategoryRepository {
        categories: Vec<Category>,
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepository {
        async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
            Ok(category)
        }

        async fn update(&self, category: Category) -> Result<Category, RepositoryError> {
            Ok(category)
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Category>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError> {
            Ok(self
                .categories
                .iter()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn daily_habit(user_id: Uuid, title: &str, start: NaiveDate) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            category: "Health".to_string(),
            frequency: Frequency::Daily,
            selected_days: Vec::new(),
            start_date: start,
            completed_dates: Vec::new(),
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            enable_reminder: false,
            created_at: Utc::now(),
        }
    }

    fn test_service(habits: Vec<Habit>, categories: Vec<Category>) -> StatsServiceImpl {
        StatsServiceImpl::new(
            Arc::new(MockHabitRepository {
                habits: Mutex::new(habits),
            }),
            Arc::new(MockCategoryRepository { categories }),
        )
    }

    #[tokio::test]
    async fn test_unknown_range_is_rejected() {
        let service = test_service(vec![], vec![]);
        let result = service
            .get_overview(Uuid::new_v4(), Some("14days".to_string()))
            .await;
        assert!(matches!(result, Err(StatsError::InvalidRange(_))));
    }

    #[tokio::test]
    async fn test_range_defaults_to_last_7_days() {
        let service = test_service(vec![], vec![]);
        let overview = service.get_overview(Uuid::new_v4(), None).await.unwrap();
        assert_eq!(overview.range, TimeRange::Last7Days);
        assert_eq!(overview.daily.len(), 7);
    }

    #[tokio::test]
    async fn test_overview_assembles_all_sections() {
        let user_id = Uuid::new_v4();
        let today = Utc::now().date_naive();
        let mut habit = daily_habit(user_id, "Run", today);
        habit.completed_dates.push(today);

        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: "Health".to_string(),
            color: "#22c55e".to_string(),
            created_at: Utc::now(),
        };

        let service = test_service(vec![habit], vec![category]);
        let overview = service
            .get_overview(user_id, Some("7days".to_string()))
            .await
            .unwrap();

        assert_eq!(overview.completion_rate, 100);
        assert_eq!(overview.current_streak, 1);
        assert_eq!(overview.categories.len(), 1);
        assert_eq!(overview.categories[0].name, "Health");
        assert_eq!(overview.best_habits[0].title, "Run");
        assert_eq!(overview.daily.last().unwrap().completed, 1);
    }

    #[tokio::test]
    async fn test_overview_empty_collections_zero_guarded() {
        let service = test_service(vec![], vec![]);
        let overview = service
            .get_overview(Uuid::new_v4(), Some("30days".to_string()))
            .await
            .unwrap();

        assert_eq!(overview.completion_rate, 0);
        assert_eq!(overview.current_streak, 0);
        assert!(overview.categories.is_empty());
        assert!(overview.best_habits.is_empty());
        assert_eq!(overview.daily.len(), 30);
    }
}
