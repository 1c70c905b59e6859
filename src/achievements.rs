//! Achievement catalog and the pure synchronization planner.
//!
//! `plan_sync` re-derives progress from a metrics snapshot instead of
//! applying incremental deltas, so running it repeatedly against the
//! same inputs yields an empty plan.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::models::achievement::{Achievement, AchievementType};
use crate::models::habit::{Frequency, Habit};
use crate::recurrence::{should_occur_on_date, weekday_index};

/// One row of the fixed achievement catalog
pub struct CatalogEntry {
    pub achievement_type: AchievementType,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub target: i32,
    pub xp: i32,
}

/// Fixed, versioned achievement catalog seeded once per user.
/// Order here is the canonical processing order for a sync pass.
pub const ACHIEVEMENT_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        achievement_type: AchievementType::FirstHabit,
        name: "Getting Started",
        description: "Create your first habit",
        icon: "seedling",
        target: 1,
        xp: 50,
    },
    CatalogEntry {
        achievement_type: AchievementType::HabitsCompleted,
        name: "Half Century",
        description: "Complete habits 50 times",
        icon: "check",
        target: 50,
        xp: 200,
    },
    CatalogEntry {
        achievement_type: AchievementType::HabitStreak,
        name: "On Fire",
        description: "Reach a 7-day streak on one habit",
        icon: "flame",
        target: 7,
        xp: 150,
    },
    CatalogEntry {
        achievement_type: AchievementType::LifetimeStreak,
        name: "Marathon",
        description: "Reach a 30-day best streak",
        icon: "trophy",
        target: 30,
        xp: 300,
    },
    CatalogEntry {
        achievement_type: AchievementType::Categories,
        name: "Organizer",
        description: "Spread habits across 3 categories",
        icon: "folders",
        target: 3,
        xp: 100,
    },
    CatalogEntry {
        achievement_type: AchievementType::TotalHabits,
        name: "Collector",
        description: "Track 5 habits at once",
        icon: "stack",
        target: 5,
        xp: 100,
    },
    CatalogEntry {
        achievement_type: AchievementType::PerfectWeek,
        name: "Perfect Week",
        description: "Complete every scheduled habit for a full week",
        icon: "star",
        target: 1,
        xp: 250,
    },
    CatalogEntry {
        achievement_type: AchievementType::HabitAge,
        name: "Veteran",
        description: "Keep a habit for 30 days",
        icon: "calendar",
        target: 30,
        xp: 200,
    },
    CatalogEntry {
        achievement_type: AchievementType::DailyHabits,
        name: "Day by Day",
        description: "Track 3 daily habits",
        icon: "sun",
        target: 3,
        xp: 100,
    },
    CatalogEntry {
        achievement_type: AchievementType::WeeklyHabits,
        name: "Week Planner",
        description: "Track 3 weekly habits",
        icon: "calendar-week",
        target: 3,
        xp: 100,
    },
    CatalogEntry {
        achievement_type: AchievementType::MonthlyHabits,
        name: "Long Game",
        description: "Track 2 monthly habits",
        icon: "moon",
        target: 2,
        xp: 100,
    },
];

/// Position of an achievement type in the catalog, used to keep sync
/// passes in a deterministic order
pub fn catalog_index(achievement_type: AchievementType) -> usize {
    ACHIEVEMENT_CATALOG
        .iter()
        .position(|entry| entry.achievement_type == achievement_type)
        .unwrap_or(ACHIEVEMENT_CATALOG.len())
}

/// Single metrics snapshot derived from the full habit collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitMetrics {
    pub total_completions: i32,
    pub max_current_streak: i32,
    pub max_best_streak: i32,
    pub category_count: i32,
    pub total_habits: i32,
    pub daily_habits: i32,
    pub weekly_habits: i32,
    pub monthly_habits: i32,
    pub perfect_weeks: i32,
    pub oldest_habit_age_days: i32,
}

impl HabitMetrics {
    pub fn compute(habits: &[Habit], today: NaiveDate) -> Self {
        let mut categories: Vec<String> = habits
            .iter()
            .map(|h| h.category.to_ascii_lowercase())
            .collect();
        categories.sort();
        categories.dedup();

        Self {
            total_completions: habits.iter().map(|h| h.total_completions).sum(),
            max_current_streak: habits.iter().map(|h| h.current_streak).max().unwrap_or(0),
            max_best_streak: habits.iter().map(|h| h.best_streak).max().unwrap_or(0),
            category_count: categories.len() as i32,
            total_habits: habits.len() as i32,
            daily_habits: count_frequency(habits, Frequency::Daily),
            weekly_habits: count_frequency(habits, Frequency::Weekly),
            monthly_habits: count_frequency(habits, Frequency::Monthly),
            perfect_weeks: perfect_weeks(habits, today),
            oldest_habit_age_days: habits
                .iter()
                .map(|h| (today - h.start_date).num_days().max(0) as i32)
                .max()
                .unwrap_or(0),
        }
    }
}

fn count_frequency(habits: &[Habit], frequency: Frequency) -> i32 {
    habits.iter().filter(|h| h.frequency == frequency).count() as i32
}

/// Best-effort perfect-week count over the past 52 Sunday-aligned weeks.
/// A week is perfect when it scheduled at least one occurrence and every
/// scheduled occurrence was completed; the current partial week is not
/// considered.
fn perfect_weeks(habits: &[Habit], today: NaiveDate) -> i32 {
    let Some(current_week_start) = today.checked_sub_days(Days::new(weekday_index(today) as u64))
    else {
        return 0;
    };

    let mut count = 0;
    for weeks_back in 1..=52 {
        let Some(week_start) = current_week_start.checked_sub_days(Days::new(7 * weeks_back))
        else {
            break;
        };
        let mut scheduled = 0;
        let mut completed = 0;
        for offset in 0..7 {
            let day = week_start + chrono::Duration::days(offset);
            for habit in habits {
                if should_occur_on_date(habit, day) {
                    scheduled += 1;
                    if habit.completed_dates.contains(&day) {
                        completed += 1;
                    }
                }
            }
        }
        if scheduled > 0 && scheduled == completed {
            count += 1;
        }
    }
    count
}

/// Metric value an achievement type is measured against
pub fn metric_for(achievement_type: AchievementType, metrics: &HabitMetrics) -> i32 {
    match achievement_type {
        AchievementType::FirstHabit => metrics.total_habits,
        AchievementType::HabitsCompleted => metrics.total_completions,
        AchievementType::HabitStreak => metrics.max_current_streak,
        AchievementType::LifetimeStreak => metrics.max_best_streak,
        AchievementType::Categories => metrics.category_count,
        AchievementType::TotalHabits => metrics.total_habits,
        AchievementType::PerfectWeek => metrics.perfect_weeks,
        AchievementType::HabitAge => metrics.oldest_habit_age_days,
        AchievementType::DailyHabits => metrics.daily_habits,
        AchievementType::WeeklyHabits => metrics.weekly_habits,
        AchievementType::MonthlyHabits => metrics.monthly_habits,
    }
}

/// One planned persistence step for an achievement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementUpdate {
    pub achievement_id: Uuid,
    pub achievement_type: AchievementType,
    pub progress: i32,
    pub progress_changed: bool,
    pub unlock: bool,
}

/// Reconcile the achievement catalog against a metrics snapshot.
///
/// Unlocked achievements are terminal and skipped. Locked progress only
/// moves forward: a regressing metric (habit deleted, completion undone)
/// leaves the stored value in place. The unlock condition is checked on
/// every visit, so an achievement left at or above target by a missed
/// prior pass still unlocks here. Unchanged inputs produce an empty
/// plan.
pub fn plan_sync(achievements: &[Achievement], metrics: &HabitMetrics) -> Vec<AchievementUpdate> {
    let mut plan = Vec::new();
    for achievement in achievements {
        if achievement.unlocked {
            continue;
        }
        let metric = metric_for(achievement.achievement_type, metrics);
        let progress = achievement.progress.max(metric);
        let progress_changed = progress != achievement.progress;
        let unlock = progress >= achievement.target;
        if progress_changed || unlock {
            plan.push(AchievementUpdate {
                achievement_id: achievement.id,
                achievement_type: achievement.achievement_type,
                progress,
                progress_changed,
                unlock,
            });
        }
    }
    plan
}
