use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Requested statistics window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
    #[serde(rename = "all")]
    AllTime,
}

impl TimeRange {
    /// Number of calendar days in the window, ending at "today" inclusive.
    /// All-time uses 365 as a practical ceiling.
    pub fn days(self) -> u32 {
        match self {
            TimeRange::Last7Days => 7,
            TimeRange::Last30Days => 30,
            TimeRange::Last90Days => 90,
            TimeRange::AllTime => 365,
        }
    }

    /// Parse the `range` query parameter
    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "7days" => Some(TimeRange::Last7Days),
            "30days" => Some(TimeRange::Last30Days),
            "90days" => Some(TimeRange::Last90Days),
            "all" => Some(TimeRange::AllTime),
            _ => None,
        }
    }
}

/// Per-category completion statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryStats {
    pub name: String,
    /// Habits in this category scheduled at least once in the window
    pub count: u32,
    pub completed_count: u32,
    pub completion_rate: u32,
    pub color: String,
}

/// One day of the completion trend series
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DailyCompletion {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub rate: u32,
}

/// Per-title completion ranking entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HabitRanking {
    pub title: String,
    pub completion_rate: u32,
}

/// Best and worst habit series ranked by completion rate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HabitRankings {
    pub best: Vec<HabitRanking>,
    pub worst: Vec<HabitRanking>,
}

/// Full statistics overview returned by `GET /api/stats`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsOverview {
    pub range: TimeRange,
    pub completion_rate: u32,
    pub current_streak: u32,
    pub categories: Vec<CategoryStats>,
    pub daily: Vec<DailyCompletion>,
    pub best_habits: Vec<HabitRanking>,
    pub worst_habits: Vec<HabitRanking>,
}
