use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

/// Fixed enumeration of achievement kinds
///
/// Each kind maps 1:1 to a metric derived from the habit snapshot, see
/// `crate::achievements::metric_for`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    FirstHabit,
    HabitsCompleted,
    HabitStreak,
    LifetimeStreak,
    Categories,
    TotalHabits,
    PerfectWeek,
    HabitAge,
    DailyHabits,
    WeeklyHabits,
    MonthlyHabits,
}

/// Achievement entity, seeded once per user from the fixed catalog
///
/// Invariants: `progress` is monotonically non-decreasing while locked;
/// once `unlocked` flips true nothing regresses and `unlocked_at` is
/// stamped exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, sqlx::FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_type: AchievementType,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub progress: i32,
    pub target: i32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub xp: i32,
}
