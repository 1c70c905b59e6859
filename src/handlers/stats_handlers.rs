use axum::{
    Json,
    extract::{Extension, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::handlers::ErrorResponse;
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::stats::StatsOverview;
use crate::services::stats_service::{StatsError, StatsService};

/// Convert StatsError to HTTP response
impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            StatsError::InvalidRange(ref range) => (
                StatusCode::BAD_REQUEST,
                "stats/invalid-range",
                format!("Unknown range '{}', expected one of 7days, 30days, 90days, all", range),
            ),
            StatsError::DatabaseError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "stats/database-error", msg)
            }
        };

        let error_response = ErrorResponse::new(error_type, &message);
        (status, Json(error_response)).into_response()
    }
}

/// Query parameters for the statistics overview
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatsQuery {
    /// One of 7days, 30days, 90days, all. Defaults to 7days.
    pub range: Option<String>,
}

/// Handler for the statistics overview
#[utoipa::path(
    get,
    path = "/api/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Statistics overview", body = StatsOverview),
        (status = 400, description = "Unknown range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "stats"
)]
pub async fn get_stats_handler(
    State(stats_service): State<Arc<dyn StatsService>>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsOverview>, Response> {
    match stats_service.get_overview(auth_user.user_id, query.range).await {
        Ok(overview) => Ok(Json(overview)),
        Err(e) => Err(e.into_response()),
    }
}
