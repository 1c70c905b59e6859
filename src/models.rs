pub mod achievement;
pub mod assistant;
pub mod auth;
pub mod category;
pub mod habit;
pub mod stats;
pub mod user;

pub use achievement::{Achievement, AchievementType};
pub use assistant::{ChatRequest, ChatResponse};
pub use auth::{AuthToken, LoginRequest};
pub use category::{
    ALL_CATEGORY, Category, CreateCategoryRequest, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_NAME,
    UpdateCategoryRequest,
};
pub use habit::{
    CreateHabitRequest, Frequency, Habit, ToggleCompletionRequest, UpdateHabitRequest,
};
pub use stats::{
    CategoryStats, DailyCompletion, HabitRanking, HabitRankings, StatsOverview, TimeRange,
};
pub use user::{CreateUserRequest, User};
