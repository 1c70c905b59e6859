use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{ErrorResponse, validation_error_response};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::services::category_service::{CategoryError, CategoryService};

/// Convert CategoryError to HTTP response
impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            CategoryError::DuplicateName => (
                StatusCode::CONFLICT,
                "categories/duplicate-name",
                "Category with this name already exists",
            ),
            CategoryError::DuplicateColor => (
                StatusCode::CONFLICT,
                "categories/duplicate-color",
                "Category with this color already exists",
            ),
            CategoryError::ReservedName => (
                StatusCode::BAD_REQUEST,
                "categories/reserved-name",
                "This category name is reserved",
            ),
            CategoryError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                "categories/not-found",
                "Category not found",
            ),
            CategoryError::Forbidden => (
                StatusCode::FORBIDDEN,
                "categories/forbidden",
                "Unauthorized to access this category",
            ),
            CategoryError::CannotDeleteDefault => (
                StatusCode::BAD_REQUEST,
                "categories/cannot-delete-default",
                "The default category cannot be deleted",
            ),
            CategoryError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "categories/database-error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for listing categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Category>>, Response> {
    match category_service.get_categories(auth_user.user_id).await {
        Ok(categories) => Ok(Json(categories)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category successfully created", body = Category),
        (status = 400, description = "Validation error or reserved name", body = ErrorResponse),
        (status = 409, description = "Duplicate name or color", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match category_service
        .create_category(auth_user.user_id, request)
        .await
    {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category successfully updated", body = Category),
        (status = 400, description = "Validation error or reserved name", body = ErrorResponse),
        (status = 403, description = "User doesn't own the category", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Duplicate name or color", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category_id): Path<Uuid>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match category_service
        .update_category(auth_user.user_id, category_id, request)
        .await
    {
        Ok(category) => Ok(Json(category)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a category
///
/// Habits assigned to the deleted category are reassigned to the
/// default category, never deleted.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted, habits reassigned"),
        (status = 400, description = "The default category cannot be deleted", body = ErrorResponse),
        (status = 403, description = "User doesn't own the category", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match category_service
        .delete_category(auth_user.user_id, category_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
