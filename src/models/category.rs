use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_color_token;

/// Reserved pseudo-category denoting "no filter". Never persisted and
/// never creatable, renamable or deletable.
pub const ALL_CATEGORY: &str = "All";

/// Default category habits are reassigned to when their category is
/// deleted. Auto-created on demand and protected from deletion itself.
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorized";
pub const DEFAULT_CATEGORY_COLOR: &str = "#64748b";

/// Category entity used to classify habits
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Unique per user, case-insensitive
    pub name: String,
    /// Hex color token, unique per user
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Health",
    "color": "#22c55e"
}))]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: String,

    #[validate(custom(function = "validate_color_token"))]
    #[schema(example = "#22c55e")]
    pub color: String,
}

/// Request payload for updating an existing category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "name": "Fitness" }))]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_color_token"))]
    pub color: Option<String>,
}
