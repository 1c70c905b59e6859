use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::achievement::Achievement;
use crate::services::achievement_service::{AchievementError, AchievementService, SyncOutcome};

/// Convert AchievementError to HTTP response
impl IntoResponse for AchievementError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            AchievementError::AchievementNotFound => (
                StatusCode::NOT_FOUND,
                "achievements/not-found",
                "Achievement not found",
            ),
            AchievementError::DatabaseError(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "achievements/database-error",
                msg.as_str(),
            ),
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

/// Handler for listing achievements
///
/// Seeds the fixed catalog on first read of an empty collection.
#[utoipa::path(
    get,
    path = "/api/achievements",
    responses(
        (status = 200, description = "The user's achievement catalog", body = Vec<Achievement>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn list_achievements_handler(
    State(achievement_service): State<Arc<dyn AchievementService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Achievement>>, Response> {
    match achievement_service.list(auth_user.user_id).await {
        Ok(achievements) => Ok(Json(achievements)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for triggering an achievement sync
///
/// Recomputes progress from the current habit snapshot and persists
/// only what changed. Safe to call repeatedly; a pass already in flight
/// reports `skipped`.
#[utoipa::path(
    post,
    path = "/api/achievements/sync",
    responses(
        (status = 200, description = "Sync outcome", body = SyncOutcome),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "achievements"
)]
pub async fn sync_achievements_handler(
    State(achievement_service): State<Arc<dyn AchievementService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<SyncOutcome>, Response> {
    match achievement_service.sync(auth_user.user_id).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err(e.into_response()),
    }
}
