use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_selected_days;

/// How often a habit is scheduled to occur
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Habit entity tracked by a user
///
/// `selected_days` holds weekday abbreviations (`Sun`..`Sat`) for weekly
/// habits and day-of-month numerals (`"1"`..`"31"`) for monthly habits;
/// daily habits keep it empty. `completed_dates` is kept sorted and free
/// of duplicates by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, sqlx::FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Category name reference; stale references are skipped in derived views
    pub category: String,
    pub frequency: Frequency,
    pub selected_days: Vec<String>,
    pub start_date: NaiveDate,
    pub completed_dates: Vec<NaiveDate>,
    pub current_streak: i32,
    pub best_streak: i32,
    pub total_completions: i32,
    pub enable_reminder: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new habit
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "title": "Morning run",
    "category": "Health",
    "frequency": "weekly",
    "selected_days": ["Mon", "Wed", "Fri"],
    "start_date": "2024-01-15",
    "enable_reminder": true
}))]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: String,

    #[schema(example = "Health")]
    pub category: Option<String>,

    pub frequency: Frequency,

    #[validate(custom(function = "validate_selected_days"))]
    pub selected_days: Option<Vec<String>>,

    /// Defaults to today when omitted
    #[schema(format = "date", example = "2024-01-15")]
    pub start_date: Option<NaiveDate>,

    #[schema(default = false)]
    pub enable_reminder: Option<bool>,
}

/// Request payload for updating an existing habit
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "title": "Evening run",
    "frequency": "daily"
}))]
pub struct UpdateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Title must not be empty"))]
    pub title: Option<String>,

    pub category: Option<String>,

    pub frequency: Option<Frequency>,

    #[validate(custom(function = "validate_selected_days"))]
    pub selected_days: Option<Vec<String>>,

    #[schema(format = "date")]
    pub start_date: Option<NaiveDate>,

    pub enable_reminder: Option<bool>,
}

/// Request payload for toggling a completion
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "date": "2024-01-15" }))]
pub struct ToggleCompletionRequest {
    /// Defaults to today when omitted
    #[schema(format = "date")]
    pub date: Option<NaiveDate>,
}
