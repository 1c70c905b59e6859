//! Router assembly shared by the binary and the integration tests.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::achievement_handlers::{list_achievements_handler, sync_achievements_handler};
use crate::handlers::assistant_handlers::chat_handler;
use crate::handlers::auth_handlers::{login_handler, register_handler};
use crate::handlers::category_handlers::{
    create_category_handler, delete_category_handler, list_categories_handler,
    update_category_handler,
};
use crate::handlers::habit_handlers::{
    create_habit_handler, delete_habit_handler, list_habits_handler, toggle_completion_handler,
    update_habit_handler, watch_habits_handler,
};
use crate::handlers::stats_handlers::get_stats_handler;
use crate::middleware::auth_middleware::auth_middleware;
use crate::middleware::rate_limit::{RateLimitStore, rate_limit_middleware};
use crate::models::habit::Habit;
use crate::services::achievement_service::AchievementService;
use crate::services::assistant_service::AssistantService;
use crate::services::auth_service::AuthService;
use crate::services::category_service::CategoryService;
use crate::services::habit_service::HabitService;
use crate::services::stats_service::StatsService;
use crate::subscriptions::SnapshotHub;

/// Shared application state; handlers extract the service they need
/// through the `FromRef` impls below
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub habit_service: Arc<dyn HabitService>,
    pub category_service: Arc<dyn CategoryService>,
    pub achievement_service: Arc<dyn AchievementService>,
    pub stats_service: Arc<dyn StatsService>,
    pub assistant_service: Arc<dyn AssistantService>,
    pub habit_hub: Arc<SnapshotHub<Habit>>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
}

impl FromRef<AppState> for Arc<dyn AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn HabitService> {
    fn from_ref(state: &AppState) -> Self {
        state.habit_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CategoryService> {
    fn from_ref(state: &AppState) -> Self {
        state.category_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AchievementService> {
    fn from_ref(state: &AppState) -> Self {
        state.achievement_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn StatsService> {
    fn from_ref(state: &AppState) -> Self {
        state.stats_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AssistantService> {
    fn from_ref(state: &AppState) -> Self {
        state.assistant_service.clone()
    }
}

impl FromRef<AppState> for Arc<SnapshotHub<Habit>> {
    fn from_ref(state: &AppState) -> Self {
        state.habit_hub.clone()
    }
}

impl FromRef<AppState> for Arc<dyn RateLimitStore> {
    fn from_ref(state: &AppState) -> Self {
        state.rate_limiter.clone()
    }
}

/// Build the API router over the given state
pub fn build_router(state: AppState) -> Router {
    // Everything under /api except auth requires a bearer token
    let protected = Router::new()
        .route("/api/habits", get(list_habits_handler).post(create_habit_handler))
        .route(
            "/api/habits/{id}",
            axum::routing::put(update_habit_handler).delete(delete_habit_handler),
        )
        .route("/api/habits/{id}/toggle", post(toggle_completion_handler))
        .route("/api/habits/watch", get(watch_habits_handler))
        .route(
            "/api/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/api/categories/{id}",
            axum::routing::put(update_category_handler).delete(delete_category_handler),
        )
        .route("/api/achievements", get(list_achievements_handler))
        .route("/api/achievements/sync", post(sync_achievements_handler))
        .route("/api/stats", get(get_stats_handler))
        .route("/api/assistant/chat", post(chat_handler))
        .layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
