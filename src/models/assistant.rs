use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for the coaching assistant
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "message": "How am I doing with my habits this week?" }))]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must not be empty"))]
    pub message: String,
}

/// Assistant reply
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}
