use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::achievement::Achievement;
use crate::repositories::RepositoryError;

const ACHIEVEMENT_COLUMNS: &str = "id, user_id, achievement_type, name, description, icon, \
     progress, target, unlocked, unlocked_at, xp";

/// Trait defining achievement repository operations, the persistence
/// half of the store contract consumed by the synchronizer
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Insert the seeded catalog rows for a user in one batch
    async fn insert_many(&self, achievements: Vec<Achievement>) -> Result<(), RepositoryError>;

    /// Find all achievements for a user
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Achievement>, RepositoryError>;

    /// Set an achievement's progress counter
    async fn update_progress(
        &self,
        user_id: Uuid,
        achievement_id: Uuid,
        progress: i32,
    ) -> Result<Achievement, RepositoryError>;

    /// Flip an achievement to unlocked, stamping the unlock time.
    /// Already-unlocked rows keep their original stamp.
    async fn unlock(
        &self,
        user_id: Uuid,
        achievement_id: Uuid,
        unlocked_at: DateTime<Utc>,
    ) -> Result<Achievement, RepositoryError>;
}

/// PostgreSQL implementation of AchievementRepository
pub struct PostgresAchievementRepository {
    pool: PgPool,
}

impl PostgresAchievementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementRepository for PostgresAchievementRepository {
    async fn insert_many(&self, achievements: Vec<Achievement>) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        for achievement in &achievements {
            sqlx::query(
                r#"
                INSERT INTO achievements (
                    id, user_id, achievement_type, name, description, icon,
                    progress, target, unlocked, unlocked_at, xp
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (user_id, achievement_type) DO NOTHING
                "#,
            )
            .bind(achievement.id)
            .bind(achievement.user_id)
            .bind(achievement.achievement_type)
            .bind(&achievement.name)
            .bind(&achievement.description)
            .bind(&achievement.icon)
            .bind(achievement.progress)
            .bind(achievement.target)
            .bind(achievement.unlocked)
            .bind(achievement.unlocked_at)
            .bind(achievement.xp)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Achievement>, RepositoryError> {
        let query =
            format!("SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE user_id = $1");

        sqlx::query_as::<_, Achievement>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn update_progress(
        &self,
        user_id: Uuid,
        achievement_id: Uuid,
        progress: i32,
    ) -> Result<Achievement, RepositoryError> {
        let query = format!(
            r#"
            UPDATE achievements
            SET progress = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {ACHIEVEMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Achievement>(&query)
            .bind(achievement_id)
            .bind(user_id)
            .bind(progress)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
            .ok_or(RepositoryError::NotFound)
    }

    async fn unlock(
        &self,
        user_id: Uuid,
        achievement_id: Uuid,
        unlocked_at: DateTime<Utc>,
    ) -> Result<Achievement, RepositoryError> {
        let query = format!(
            r#"
            UPDATE achievements
            SET unlocked = TRUE,
                unlocked_at = COALESCE(unlocked_at, $3)
            WHERE id = $1 AND user_id = $2
            RETURNING {ACHIEVEMENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Achievement>(&query)
            .bind(achievement_id)
            .bind(user_id)
            .bind(unlocked_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?
            .ok_or(RepositoryError::NotFound)
    }
}
