use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::Category;
use crate::repositories::RepositoryError;

/// Trait defining category repository operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Update an existing category's name and color
    async fn update(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Find a category by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;

    /// Find all categories for a user, sorted by name
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError>;

    /// Delete a category by ID
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// PostgreSQL implementation of CategoryRepository
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, user_id, name, color, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, color, created_at
            "#,
        )
        .bind(category.id)
        .bind(category.user_id)
        .bind(&category.name)
        .bind(&category.color)
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn update(&self, category: Category) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, color = $3
            WHERE id = $1
            RETURNING id, user_id, name, color, created_at
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?
        .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM categories
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
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
}
