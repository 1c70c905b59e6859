pub mod achievements;
pub mod app;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod recurrence;
pub mod repositories;
pub mod services;
pub mod stats;
pub mod subscriptions;
pub mod validation;
