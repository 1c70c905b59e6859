pub mod achievement_service;
pub mod assistant_service;
pub mod auth_service;
pub mod category_service;
pub mod habit_service;
pub mod stats_service;
