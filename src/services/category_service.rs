use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::{
    ALL_CATEGORY, Category, CreateCategoryRequest, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_NAME,
    UpdateCategoryRequest,
};
use crate::repositories::RepositoryError;
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::habit_repository::HabitRepository;

/// Category service errors
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Category with this name already exists")]
    DuplicateName,

    #[error("Category with this color already exists")]
    DuplicateColor,

    #[error("This category name is reserved")]
    ReservedName,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Unauthorized to access this category")]
    Forbidden,

    #[error("The default category cannot be deleted")]
    CannotDeleteDefault,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for CategoryError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => CategoryError::CategoryNotFound,
            RepositoryError::ConstraintViolation(_) => CategoryError::DuplicateName,
            RepositoryError::DatabaseError(msg) => CategoryError::DatabaseError(msg),
        }
    }
}

/// Trait defining category service operations
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Get all categories for a user. The reserved "All" filter
    /// pseudo-category is a client-side sentinel and never appears here.
    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CategoryError>;

    /// Create a new category
    async fn create_category(
        &self,
        user_id: Uuid,
        request: CreateCategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Update an existing category
    async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Delete a category, reassigning its habits to the default category
    async fn delete_category(&self, user_id: Uuid, category_id: Uuid)
    -> Result<(), CategoryError>;
}

/// Implementation of CategoryService
pub struct CategoryServiceImpl {
    category_repository: Arc<dyn CategoryRepository>,
    habit_repository: Arc<dyn HabitRepository>,
}

impl CategoryServiceImpl {
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        habit_repository: Arc<dyn HabitRepository>,
    ) -> Self {
        Self {
            category_repository,
            habit_repository,
        }
    }

    fn is_reserved(name: &str) -> bool {
        name.trim().eq_ignore_ascii_case(ALL_CATEGORY)
    }

    /// Reject duplicate names (case-insensitive) and duplicate colors,
    /// ignoring the category being updated itself
    fn check_duplicates(
        existing: &[Category],
        name: Option<&str>,
        color: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<(), CategoryError> {
        for category in existing.iter().filter(|c| Some(c.id) != exclude) {
            if let Some(name) = name {
                if category.name.eq_ignore_ascii_case(name.trim()) {
                    return Err(CategoryError::DuplicateName);
                }
            }
            if let Some(color) = color {
                if category.color.eq_ignore_ascii_case(color) {
                    return Err(CategoryError::DuplicateColor);
                }
            }
        }
        Ok(())
    }

    /// Find or create the default category habits are reassigned to.
    /// The default row is materialized only when first needed.
    async fn get_or_create_default(&self, user_id: Uuid) -> Result<Category, CategoryError> {
        let existing = self.category_repository.find_by_user(user_id).await?;
        if let Some(default) = existing
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(DEFAULT_CATEGORY_NAME))
        {
            return Ok(default);
        }

        let default = Category {
            id: Uuid::new_v4(),
            user_id,
            name: DEFAULT_CATEGORY_NAME.to_string(),
            color: DEFAULT_CATEGORY_COLOR.to_string(),
            created_at: Utc::now(),
        };
        Ok(self.category_repository.create(default).await?)
    }

    async fn find_owned(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<Category, CategoryError> {
        let category = self
            .category_repository
            .find_by_id(category_id)
            .await?
            .ok_or(CategoryError::CategoryNotFound)?;
        if category.user_id != user_id {
            return Err(CategoryError::Forbidden);
        }
        Ok(category)
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>, CategoryError> {
        Ok(self.category_repository.find_by_user(user_id).await?)
    }

    async fn create_category(
        &self,
        user_id: Uuid,
        request: CreateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        if Self::is_reserved(&request.name) {
            return Err(CategoryError::ReservedName);
        }

        let existing = self.category_repository.find_by_user(user_id).await?;
        Self::check_duplicates(&existing, Some(&request.name), Some(&request.color), None)?;

        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: request.name.trim().to_string(),
            color: request.color,
            created_at: Utc::now(),
        };

        Ok(self.category_repository.create(category).await?)
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        let existing = self.find_owned(user_id, category_id).await?;

        if let Some(name) = &request.name {
            if Self::is_reserved(name) {
                return Err(CategoryError::ReservedName);
            }
        }

        let all = self.category_repository.find_by_user(user_id).await?;
        Self::check_duplicates(
            &all,
            request.name.as_deref(),
            request.color.as_deref(),
            Some(category_id),
        )?;

        let new_name = request
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| existing.name.clone());
        let renamed = !new_name.eq_ignore_ascii_case(&existing.name);

        let updated = Category {
            id: category_id,
            user_id,
            name: new_name,
            color: request.color.unwrap_or_else(|| existing.color.clone()),
            created_at: existing.created_at,
        };
        let updated = self.category_repository.update(updated).await?;

        // Keep habit references in step with the rename
        if renamed {
            self.habit_repository
                .reassign_category(user_id, &existing.name, &updated.name)
                .await?;
        }

        Ok(updated)
    }

    async fn delete_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
    ) -> Result<(), CategoryError> {
        let category = self.find_owned(user_id, category_id).await?;
        if category.name.eq_ignore_ascii_case(DEFAULT_CATEGORY_NAME) {
            return Err(CategoryError::CannotDeleteDefault);
        }

        // Habits must never be left dangling: materialize the default
        // category first, then move them over
        let default = self.get_or_create_default(user_id).await?;
        self.habit_repository
            .reassign_category(user_id, &category.name, &default.name)
            .await?;

        Ok(self.category_repository.delete(category_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::{Frequency, Habit};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockCategoryRepository {
        categories: Mutex<HashMap<Uuid, Category>>,
    }

    impl MockCategoryRepository {
        fn new() -> Self {
            Self {
                categories: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepository {
        async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
            let mut categories = self.categories.lock().unwrap();
            if categories
                .values()
                .any(|c| c.user_id == category.user_id && c.name == category.name)
            {
                return Err(RepositoryError::ConstraintViolation(
                    "Category already exists".to_string(),
                ));
            }
            categories.insert(category.id, category.clone());
            Ok(category)
        }

        async fn update(&self, category: Category) -> Result<Category, RepositoryError> {
            let mut categories = self.categories.lock().unwrap();
            if !categories.contains_key(&category.id) {
                return Err(RepositoryError::NotFound);
            }
            categories.insert(category.id, category.clone());
            Ok(category)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
            Ok(self.categories.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Category>, RepositoryError> {
            let categories = self.categories.lock().unwrap();
            let mut result: Vec<Category> = categories
                .values()
                .filter(|c| c.user_id == user_id)
                .cloned()
                .collect();
            result.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(result)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.categories
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        }
    }

    struct MockHabitRepository {
        habits: Mutex<Vec<Habit>>,
    }

    impl MockHabitRepository {
        fn new() -> Self {
            Self {
                habits: Mutex::new(Vec::new()),
            }
        }

        fn add_habit(&self, user_id: Uuid, category: &str) -> Uuid {
            let habit = Habit {
                id: Uuid::new_v4(),
                user_id,
                title: "Habit".to_string(),
                category: category.to_string(),
                frequency: Frequency::Daily,
                selected_days: Vec::new(),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                completed_dates: Vec::new(),
                current_streak: 0,
                best_streak: 0,
                total_completions: 0,
                enable_reminder: false,
                created_at: Utc::now(),
            };
            let id = habit.id;
            self.habits.lock().unwrap().push(habit);
            id
        }
    }

    #[async_trait]
    impl HabitRepository for MockHabitRepository {
        async fn create(&self, habit: Habit) -> Result<Habit, RepositoryError> {
            self.habits.lock().unwrap().push(habit.clone());
            Ok(habit)
        }

        async fn update(&self, habit: Habit) -> Result<Habit, RepositoryError> {
            let mut habits = self.habits.lock().unwrap();
            let existing = habits
                .iter_mut()
                .find(|h| h.id == habit.id)
                .ok_or(RepositoryError::NotFound)?;
            *existing = habit.clone();
            Ok(habit)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Habit>, RepositoryError> {
            Ok(self.habits.lock().unwrap().iter().find(|h| h.id == id).cloned())
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

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.habits.lock().unwrap().retain(|h| h.id != id);
            Ok(())
        }

        async fn reassign_category(
            &self,
            user_id: Uuid,
            from: &str,
            to: &str,
        ) -> Result<u64, RepositoryError> {
            let mut habits = self.habits.lock().unwrap();
            let mut touched = 0;
            for habit in habits.iter_mut() {
                if habit.user_id == user_id && habit.category.eq_ignore_ascii_case(from) {
                    habit.category = to.to_string();
                    touched += 1;
                }
            }
            Ok(touched)
        }
    }

    fn test_service() -> (CategoryServiceImpl, Arc<MockHabitRepository>) {
        let habit_repo = Arc::new(MockHabitRepository::new());
        let service =
            CategoryServiceImpl::new(Arc::new(MockCategoryRepository::new()), habit_repo.clone());
        (service, habit_repo)
    }

    fn create_request(name: &str, color: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_categories() {
        let (service, _) = test_service();
        let user_id = Uuid::new_v4();

        service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();
        service
            .create_category(user_id, create_request("Mind", "#3b82f6"))
            .await
            .unwrap();

        let categories = service.get_categories(user_id).await.unwrap();
        assert_eq!(categories.len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name_case_insensitive() {
        let (service, _) = test_service();
        let user_id = Uuid::new_v4();

        service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();

        let result = service
            .create_category(user_id, create_request("HEALTH", "#3b82f6"))
            .await;
        assert!(matches!(result, Err(CategoryError::DuplicateName)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_color() {
        let (service, _) = test_service();
        let user_id = Uuid::new_v4();

        service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();

        let result = service
            .create_category(user_id, create_request("Mind", "#22c55e"))
            .await;
        assert!(matches!(result, Err(CategoryError::DuplicateColor)));
    }

    #[tokio::test]
    async fn test_create_rejects_reserved_all() {
        let (service, _) = test_service();

        for name in ["All", "all", " ALL "] {
            let result = service
                .create_category(Uuid::new_v4(), create_request(name, "#22c55e"))
                .await;
            assert!(matches!(result, Err(CategoryError::ReservedName)));
        }
    }

    #[tokio::test]
    async fn test_update_rejects_rename_to_existing() {
        let (service, _) = test_service();
        let user_id = Uuid::new_v4();

        service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();
        let mind = service
            .create_category(user_id, create_request("Mind", "#3b82f6"))
            .await
            .unwrap();

        let result = service
            .update_category(
                user_id,
                mind.id,
                UpdateCategoryRequest {
                    name: Some("health".to_string()),
                    color: None,
                },
            )
            .await;
        assert!(matches!(result, Err(CategoryError::DuplicateName)));
    }

    #[tokio::test]
    async fn test_update_rename_moves_habit_references() {
        let (service, habit_repo) = test_service();
        let user_id = Uuid::new_v4();

        let health = service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();
        habit_repo.add_habit(user_id, "Health");

        service
            .update_category(
                user_id,
                health.id,
                UpdateCategoryRequest {
                    name: Some("Fitness".to_string()),
                    color: None,
                },
            )
            .await
            .unwrap();

        let habits = habit_repo.find_by_user(user_id).await.unwrap();
        assert_eq!(habits[0].category, "Fitness");
    }

    #[tokio::test]
    async fn test_delete_reassigns_habits_to_default() {
        let (service, habit_repo) = test_service();
        let user_id = Uuid::new_v4();

        let health = service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();
        for _ in 0..3 {
            habit_repo.add_habit(user_id, "Health");
        }

        service.delete_category(user_id, health.id).await.unwrap();

        // Habits survive, reassigned to the default category
        let habits = habit_repo.find_by_user(user_id).await.unwrap();
        assert_eq!(habits.len(), 3);
        assert!(habits.iter().all(|h| h.category == DEFAULT_CATEGORY_NAME));

        // The deleted category is gone, the default exists
        let categories = service.get_categories(user_id).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, DEFAULT_CATEGORY_NAME);
    }

    #[tokio::test]
    async fn test_default_category_cannot_be_deleted() {
        let (service, habit_repo) = test_service();
        let user_id = Uuid::new_v4();

        let health = service
            .create_category(user_id, create_request("Health", "#22c55e"))
            .await
            .unwrap();
        habit_repo.add_habit(user_id, "Health");
        service.delete_category(user_id, health.id).await.unwrap();

        let default = service.get_categories(user_id).await.unwrap()[0].clone();
        let result = service.delete_category(user_id, default.id).await;
        assert!(matches!(result, Err(CategoryError::CannotDeleteDefault)));
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let category = service
            .create_category(owner, create_request("Health", "#22c55e"))
            .await
            .unwrap();

        let result = service.delete_category(Uuid::new_v4(), category.id).await;
        assert!(matches!(result, Err(CategoryError::Forbidden)));
    }
}
