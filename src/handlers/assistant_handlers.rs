use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use validator::Validate;

use crate::handlers::{ErrorResponse, validation_error_response};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::assistant::{ChatRequest, ChatResponse};
use crate::services::assistant_service::{AssistantError, AssistantService};

/// Convert AssistantError to HTTP response, preserving the gateway's
/// own error detail in the message
impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let (status, error_type) = match self {
            AssistantError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "assistant/rate-limited"),
            AssistantError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "assistant/timeout"),
            AssistantError::InvalidApiKey => (StatusCode::BAD_GATEWAY, "assistant/gateway-auth"),
            AssistantError::Transport(_) | AssistantError::Http { .. } | AssistantError::Serde(_) => {
                (StatusCode::BAD_GATEWAY, "assistant/gateway-error")
            }
            AssistantError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "assistant/database-error")
            }
        };

        let error_response = ErrorResponse::new(error_type, &self.to_string());
        (status, Json(error_response)).into_response()
    }
}

/// Handler for the coaching assistant
///
/// Sends the user's message to the generative-text gateway together
/// with a snapshot of their current habit, achievement and statistics
/// state. One gateway attempt per request; failures are surfaced, the
/// client decides whether to retry.
#[utoipa::path(
    post,
    path = "/api/assistant/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 502, description = "Gateway error", body = ErrorResponse),
        (status = 504, description = "Gateway timeout", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "assistant"
)]
pub async fn chat_handler(
    State(assistant_service): State<Arc<dyn AssistantService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match assistant_service.chat(auth_user.user_id, request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(e.into_response()),
    }
}
