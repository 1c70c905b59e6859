use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use habit_tracker::app::{AppState, build_router};
use habit_tracker::handlers::ErrorResponse;
use habit_tracker::middleware::rate_limit::InMemoryRateLimiter;
use habit_tracker::models::achievement::{Achievement, AchievementType};
use habit_tracker::models::assistant::{ChatRequest, ChatResponse};
use habit_tracker::models::auth::{AuthToken, LoginRequest};
use habit_tracker::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use habit_tracker::models::habit::{
    CreateHabitRequest, Frequency, Habit, ToggleCompletionRequest, UpdateHabitRequest,
};
use habit_tracker::models::stats::{
    CategoryStats, DailyCompletion, HabitRanking, StatsOverview, TimeRange,
};
use habit_tracker::models::user::{CreateUserRequest, User};
use habit_tracker::repositories::achievement_repository::PostgresAchievementRepository;
use habit_tracker::repositories::category_repository::PostgresCategoryRepository;
use habit_tracker::repositories::habit_repository::PostgresHabitRepository;
use habit_tracker::repositories::user_repository::PostgresUserRepository;
use habit_tracker::services::achievement_service::{
    AchievementService, AchievementServiceImpl, SyncFailure, SyncOutcome,
};
use habit_tracker::services::assistant_service::{AssistantServiceImpl, HttpAssistantClient};
use habit_tracker::services::auth_service::{AuthService, AuthServiceImpl};
use habit_tracker::services::category_service::CategoryServiceImpl;
use habit_tracker::services::habit_service::HabitServiceImpl;
use habit_tracker::services::stats_service::StatsServiceImpl;
use habit_tracker::subscriptions::SnapshotHub;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        habit_tracker::handlers::auth_handlers::register_handler,
        habit_tracker::handlers::auth_handlers::login_handler,
        habit_tracker::handlers::habit_handlers::create_habit_handler,
        habit_tracker::handlers::habit_handlers::list_habits_handler,
        habit_tracker::handlers::habit_handlers::update_habit_handler,
        habit_tracker::handlers::habit_handlers::delete_habit_handler,
        habit_tracker::handlers::habit_handlers::toggle_completion_handler,
        habit_tracker::handlers::habit_handlers::watch_habits_handler,
        habit_tracker::handlers::category_handlers::list_categories_handler,
        habit_tracker::handlers::category_handlers::create_category_handler,
        habit_tracker::handlers::category_handlers::update_category_handler,
        habit_tracker::handlers::category_handlers::delete_category_handler,
        habit_tracker::handlers::achievement_handlers::list_achievements_handler,
        habit_tracker::handlers::achievement_handlers::sync_achievements_handler,
        habit_tracker::handlers::stats_handlers::get_stats_handler,
        habit_tracker::handlers::assistant_handlers::chat_handler,
    ),
    components(
        schemas(
            User, CreateUserRequest, LoginRequest, AuthToken,
            Habit, Frequency, CreateHabitRequest, UpdateHabitRequest, ToggleCompletionRequest,
            Category, CreateCategoryRequest, UpdateCategoryRequest,
            Achievement, AchievementType, SyncOutcome, SyncFailure,
            StatsOverview, TimeRange, CategoryStats, DailyCompletion, HabitRanking,
            ChatRequest, ChatResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "habits", description = "Habit CRUD, completion toggling and live snapshots"),
        (name = "categories", description = "Habit category management"),
        (name = "achievements", description = "Gamified achievement catalog and sync"),
        (name = "stats", description = "Completion statistics"),
        (name = "assistant", description = "AI coaching assistant"),
    ),
    info(
        title = "Habit Tracker API",
        version = "0.1.0",
        description = "REST API for habit tracking with streaks, statistics and achievements",
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Get configuration from environment
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let assistant_url = env::var("ASSISTANT_API_URL").unwrap_or_default();
    let assistant_key = env::var("ASSISTANT_API_KEY").unwrap_or_default();
    let assistant_model =
        env::var("ASSISTANT_MODEL").unwrap_or_else(|_| "general-text-small".to_string());

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed");

    // Initialize repositories
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let habit_repository = Arc::new(PostgresHabitRepository::new(pool.clone()));
    let category_repository = Arc::new(PostgresCategoryRepository::new(pool.clone()));
    let achievement_repository = Arc::new(PostgresAchievementRepository::new(pool.clone()));

    // Initialize services
    let habit_hub = Arc::new(SnapshotHub::new());
    let achievement_service: Arc<dyn AchievementService> = Arc::new(AchievementServiceImpl::new(
        achievement_repository.clone(),
        habit_repository.clone(),
    ));
    let auth_service: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
        user_repository,
        achievement_service.clone(),
        jwt_secret,
    ));
    let assistant_client = Arc::new(HttpAssistantClient::new(
        assistant_url,
        assistant_key,
        assistant_model,
    ));

    let state = AppState {
        auth_service,
        habit_service: Arc::new(HabitServiceImpl::new(
            habit_repository.clone(),
            achievement_service.clone(),
            habit_hub.clone(),
        )),
        category_service: Arc::new(CategoryServiceImpl::new(
            category_repository.clone(),
            habit_repository.clone(),
        )),
        achievement_service,
        stats_service: Arc::new(StatsServiceImpl::new(
            habit_repository.clone(),
            category_repository,
        )),
        assistant_service: Arc::new(AssistantServiceImpl::new(
            assistant_client,
            habit_repository,
            achievement_repository,
        )),
        habit_hub,
        rate_limiter: Arc::new(InMemoryRateLimiter::new(60, 1.0)),
    };

    // Build router with Swagger UI
    let app = build_router(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()));

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    tracing::info!("API docs at http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
