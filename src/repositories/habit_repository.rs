use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::habit::Habit;
use crate::repositories::RepositoryError;

const HABIT_COLUMNS: &str = "id, user_id, title, category, frequency, selected_days, \
     start_date, completed_dates, current_streak, best_streak, total_completions, \
     enable_reminder, created_at";

/// Trait defining habit repository operations
#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Create a new habit
    async fn create(&self, habit: Habit) -> Result<Habit, RepositoryError>;

    /// Update an existing habit, including its completion set and streaks
    async fn update(&self, habit: Habit) -> Result<Habit, RepositoryError>;

    /// Find a habit by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Habit>, RepositoryError>;

    /// Find all habits for a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Habit>, RepositoryError>;

    /// Delete a habit by ID
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Reassign every habit of a user from one category name to another,
    /// returning the number of habits touched
    async fn reassign_category(
        &self,
        user_id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<u64, RepositoryError>;
}

/// PostgreSQL implementation of HabitRepository
pub struct PostgresHabitRepository {
    pool: PgPool,
}

impl PostgresHabitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HabitRepository for PostgresHabitRepository {
    async fn create(&self, habit: Habit) -> Result<Habit, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO habits (
                id, user_id, title, category, frequency, selected_days,
                start_date, completed_dates, current_streak, best_streak,
                total_completions, enable_reminder, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {HABIT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Habit>(&query)
            .bind(habit.id)
            .bind(habit.user_id)
            .bind(&habit.title)
            .bind(&habit.category)
            .bind(habit.frequency)
            .bind(&habit.selected_days)
            .bind(habit.start_date)
            .bind(&habit.completed_dates)
            .bind(habit.current_streak)
            .bind(habit.best_streak)
            .bind(habit.total_completions)
            .bind(habit.enable_reminder)
            .bind(habit.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn update(&self, habit: Habit) -> Result<Habit, RepositoryError> {
        let query = format!(
            r#"
            UPDATE habits
            SET title = $2,
                category = $3,
                frequency = $4,
                selected_days = $5,
                start_date = $6,
                completed_dates = $7,
                current_streak = $8,
                best_streak = $9,
                total_completions = $10,
                enable_reminder = $11
            WHERE id = $1
            RETURNING {HABIT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Habit>(&query)
            .bind(habit.id)
            .bind(&habit.title)
            .bind(&habit.category)
            .bind(habit.frequency)
            .bind(&habit.selected_days)
            .bind(habit.start_date)
            .bind(&habit.completed_dates)
            .bind(habit.current_streak)
            .bind(habit.best_streak)
            .bind(habit.total_completions)
            .bind(habit.enable_reminder)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Habit>, RepositoryError> {
        let query = format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1");

        sqlx::query_as::<_, Habit>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Habit>, RepositoryError> {
        let query = format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Habit>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn reassign_category(
        &self,
        user_id: Uuid,
        from: &str,
        to: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE habits
            SET category = $3
            WHERE user_id = $1 AND LOWER(category) = LOWER($2)
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
