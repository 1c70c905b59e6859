pub mod achievement_handlers;
pub mod assistant_handlers;
pub mod auth_handlers;
pub mod category_handlers;
pub mod habit_handlers;
pub mod stats_handlers;

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response structure with a stable machine-readable code and a
/// human-readable message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "habits/not-found",
    "message": "Habit not found"
}))]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Render validator output as a 400 with one joined message
pub(crate) fn validation_error_response(validation_errors: validator::ValidationErrors) -> Response {
    let error_message = validation_errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");

    let error_response = ErrorResponse::new("validation/invalid-payload", &error_message);
    (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
}
