use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{ErrorResponse, validation_error_response};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::habit::{
    CreateHabitRequest, Habit, ToggleCompletionRequest, UpdateHabitRequest,
};
use crate::services::habit_service::{HabitError, HabitService};
use crate::subscriptions::SnapshotHub;

/// Convert HabitError to HTTP response
impl IntoResponse for HabitError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            HabitError::InvalidTitle => (
                StatusCode::BAD_REQUEST,
                "habits/invalid-title",
                "Title must not be empty",
            ),
            HabitError::HabitNotFound => {
                (StatusCode::NOT_FOUND, "habits/not-found", "Habit not found")
            }
            HabitError::Forbidden => (
                StatusCode::FORBIDDEN,
                "habits/forbidden",
                "Unauthorized to access this habit",
            ),
            HabitError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "habits/database-error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for creating a habit
#[utoipa::path(
    post,
    path = "/api/habits",
    request_body = CreateHabitRequest,
    responses(
        (status = 201, description = "Habit successfully created", body = Habit),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "habits"
)]
pub async fn create_habit_handler(
    State(habit_service): State<Arc<dyn HabitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match habit_service.create_habit(auth_user.user_id, request).await {
        Ok(habit) => Ok((StatusCode::CREATED, Json(habit))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing habits
///
/// Returns all habits of the authenticated user, newest first.
#[utoipa::path(
    get,
    path = "/api/habits",
    responses(
        (status = 200, description = "List of habits", body = Vec<Habit>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "habits"
)]
pub async fn list_habits_handler(
    State(habit_service): State<Arc<dyn HabitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Habit>>, Response> {
    match habit_service.get_habits(auth_user.user_id).await {
        Ok(habits) => Ok(Json(habits)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for updating a habit
#[utoipa::path(
    put,
    path = "/api/habits/{id}",
    params(("id" = Uuid, Path, description = "Habit ID")),
    request_body = UpdateHabitRequest,
    responses(
        (status = 200, description = "Habit successfully updated", body = Habit),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "User doesn't own the habit", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "habits"
)]
pub async fn update_habit_handler(
    State(habit_service): State<Arc<dyn HabitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
    Json(request): Json<UpdateHabitRequest>,
) -> Result<Json<Habit>, Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match habit_service
        .update_habit(auth_user.user_id, habit_id, request)
        .await
    {
        Ok(habit) => Ok(Json(habit)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a habit
#[utoipa::path(
    delete,
    path = "/api/habits/{id}",
    params(("id" = Uuid, Path, description = "Habit ID")),
    responses(
        (status = 204, description = "Habit successfully deleted"),
        (status = 403, description = "User doesn't own the habit", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "habits"
)]
pub async fn delete_habit_handler(
    State(habit_service): State<Arc<dyn HabitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match habit_service.delete_habit(auth_user.user_id, habit_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for toggling a completion date
///
/// Adds or removes the date (defaulting to today) from the habit's
/// completion set and recomputes its streaks.
#[utoipa::path(
    post,
    path = "/api/habits/{id}/toggle",
    params(("id" = Uuid, Path, description = "Habit ID")),
    request_body = ToggleCompletionRequest,
    responses(
        (status = 200, description = "Completion toggled", body = Habit),
        (status = 403, description = "User doesn't own the habit", body = ErrorResponse),
        (status = 404, description = "Habit not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "habits"
)]
pub async fn toggle_completion_handler(
    State(habit_service): State<Arc<dyn HabitService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
    Json(request): Json<ToggleCompletionRequest>,
) -> Result<Json<Habit>, Response> {
    match habit_service
        .toggle_completion(auth_user.user_id, habit_id, request.date)
        .await
    {
        Ok(habit) => Ok(Json(habit)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the real-time habit snapshot stream
///
/// Server-sent events; every event carries the user's full habit
/// collection after a mutation.
#[utoipa::path(
    get,
    path = "/api/habits/watch",
    responses(
        (status = 200, description = "SSE stream of habit collection snapshots")
    ),
    security(("bearer_auth" = [])),
    tag = "habits"
)]
pub async fn watch_habits_handler(
    State(habit_hub): State<Arc<SnapshotHub<Habit>>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = habit_hub
        .subscribe(auth_user.user_id)
        .filter_map(|snapshot| match snapshot {
            Ok(habits) => Some(Event::default().json_data(&habits)),
            // A lagged subscriber simply waits for the next full snapshot
            Err(_) => None,
        });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
