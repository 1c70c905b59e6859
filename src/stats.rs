//! Pure completion-statistics engine over habit snapshots.
//!
//! Every function takes an explicit `today` so results are deterministic
//! under test. Degenerate inputs (empty collections, zero scheduled
//! days) always resolve to documented defaults, never NaN or panics.

use chrono::{Days, NaiveDate};

use crate::models::category::{ALL_CATEGORY, Category};
use crate::models::habit::Habit;
use crate::models::stats::{
    CategoryStats, DailyCompletion, HabitRanking, HabitRankings, TimeRange,
};
use crate::recurrence::should_occur_on_date;

/// First day of the window ending at `today` inclusive
fn window_start(range: TimeRange, today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(range.days()) - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Percentage with the zero-guard: 0 when nothing was scheduled
fn rate(completed: u32, scheduled: u32) -> u32 {
    if scheduled == 0 {
        return 0;
    }
    (100.0 * f64::from(completed) / f64::from(scheduled)).round() as u32
}

/// Scheduled and completed (habit, day) pairs over the window
fn scheduled_pairs<'a, I>(habits: I, range: TimeRange, today: NaiveDate) -> (u32, u32)
where
    I: IntoIterator<Item = &'a Habit> + Clone,
{
    let start = window_start(range, today);
    let mut scheduled = 0;
    let mut completed = 0;
    let mut day = start;
    while day <= today {
        for habit in habits.clone() {
            if should_occur_on_date(habit, day) {
                scheduled += 1;
                if habit.completed_dates.contains(&day) {
                    completed += 1;
                }
            }
        }
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    (scheduled, completed)
}

/// Overall completion rate over all scheduled (habit, day) pairs in the
/// window, rounded to a whole percentage
pub fn completion_rate(habits: &[Habit], range: TimeRange, today: NaiveDate) -> u32 {
    let (scheduled, completed) = scheduled_pairs(habits.iter(), range, today);
    rate(completed, scheduled)
}

/// Global streak: consecutive days ending at `today` where at least one
/// habit was scheduled and every scheduled habit was completed. Stops at
/// the first failing day, including today itself.
pub fn current_streak(habits: &[Habit], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    loop {
        let scheduled: Vec<&Habit> = habits
            .iter()
            .filter(|h| should_occur_on_date(h, day))
            .collect();
        let all_completed =
            !scheduled.is_empty() && scheduled.iter().all(|h| h.completed_dates.contains(&day));
        if !all_completed {
            return streak;
        }
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => return streak,
        }
    }
}

/// Per-category statistics, sorted descending by completion rate.
/// Categories with no habit scheduled in the window are excluded; the
/// reserved "All" pseudo-category is never reported.
pub fn stats_by_category(
    habits: &[Habit],
    categories: &[Category],
    range: TimeRange,
    today: NaiveDate,
) -> Vec<CategoryStats> {
    let mut stats: Vec<CategoryStats> = categories
        .iter()
        .filter(|c| !c.name.eq_ignore_ascii_case(ALL_CATEGORY))
        .filter_map(|category| {
            let members: Vec<&Habit> = habits
                .iter()
                .filter(|h| h.category.eq_ignore_ascii_case(&category.name))
                .collect();
            let (scheduled, completed) = scheduled_pairs(members.iter().copied(), range, today);
            if scheduled == 0 {
                return None;
            }
            let start = window_start(range, today);
            let count = members
                .iter()
                .filter(|h| {
                    let mut day = start.max(h.start_date);
                    while day <= today {
                        if should_occur_on_date(h, day) {
                            return true;
                        }
                        day = match day.checked_add_days(Days::new(1)) {
                            Some(next) => next,
                            None => return false,
                        };
                    }
                    false
                })
                .count() as u32;
            Some(CategoryStats {
                name: category.name.clone(),
                count,
                completed_count: completed,
                completion_rate: rate(completed, scheduled),
                color: category.color.clone(),
            })
        })
        .collect();
    stats.sort_by(|a, b| b.completion_rate.cmp(&a.completion_rate));
    stats
}

/// One entry per calendar day of the window, counting habits the
/// recurrence rule places on that day
pub fn daily_completion_series(
    habits: &[Habit],
    range: TimeRange,
    today: NaiveDate,
) -> Vec<DailyCompletion> {
    let start = window_start(range, today);
    let mut series = Vec::with_capacity(range.days() as usize);
    let mut day = start;
    while day <= today {
        let mut total = 0;
        let mut completed = 0;
        for habit in habits {
            if should_occur_on_date(habit, day) {
                total += 1;
                if habit.completed_dates.contains(&day) {
                    completed += 1;
                }
            }
        }
        series.push(DailyCompletion {
            date: day,
            completed,
            total,
            rate: rate(completed, total),
        });
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    series
}

/// Top and bottom three habit series ranked by per-title completion rate
///
/// All entries sharing a title are aggregated as one logical series.
/// Ties keep stable input order; with fewer than three distinct titles
/// the lists simply come up short, and best/worst may overlap.
pub fn best_and_worst_habits(
    habits: &[Habit],
    range: TimeRange,
    today: NaiveDate,
) -> HabitRankings {
    let mut titles: Vec<&str> = Vec::new();
    for habit in habits {
        if !titles.contains(&habit.title.as_str()) {
            titles.push(&habit.title);
        }
    }

    let rankings: Vec<HabitRanking> = titles
        .into_iter()
        .map(|title| {
            let series = habits.iter().filter(|h| h.title == title);
            let (scheduled, completed) = scheduled_pairs(series, range, today);
            HabitRanking {
                title: title.to_string(),
                completion_rate: rate(completed, scheduled),
            }
        })
        .collect();

    let mut best = rankings.clone();
    best.sort_by(|a, b| b.completion_rate.cmp(&a.completion_rate));
    best.truncate(3);

    let mut worst = rankings;
    worst.sort_by(|a, b| a.completion_rate.cmp(&b.completion_rate));
    worst.truncate(3);

    HabitRankings { best, worst }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::Frequency;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_habit(title: &str, category: &str, start: NaiveDate) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            category: category.to_string(),
            frequency: Frequency::Daily,
            selected_days: Vec::new(),
            start_date: start,
            completed_dates: Vec::new(),
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            enable_reminder: false,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn category(name: &str, color: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn test_completion_rate_zero_guard() {
        let today = date(2024, 1, 15);
        assert_eq!(completion_rate(&[], TimeRange::Last7Days, today), 0);

        // Habit starting in the future: nothing scheduled in the window
        let h = daily_habit("Future", "Health", date(2025, 1, 1));
        assert_eq!(completion_rate(&[h], TimeRange::Last30Days, today), 0);
    }

    #[test]
    fn test_completion_rate_seven_of_ten_today() {
        let today = date(2024, 1, 15);
        let habits: Vec<Habit> = (0..10)
            .map(|i| {
                let mut h = daily_habit(&format!("Habit {}", i), "Health", today);
                if i < 7 {
                    h.completed_dates.push(today);
                }
                h
            })
            .collect();

        assert_eq!(completion_rate(&habits, TimeRange::Last7Days, today), 70);
    }

    #[test]
    fn test_completion_rate_rounds_to_whole_percentage() {
        let today = date(2024, 1, 15);
        // One habit scheduled over 3 days, 1 completed: 33.33 -> 33
        let mut h = daily_habit("Read", "Mind", date(2024, 1, 13));
        h.completed_dates.push(date(2024, 1, 13));
        assert_eq!(completion_rate(&[h], TimeRange::Last7Days, today), 33);
    }

    #[test]
    fn test_current_streak_walks_backward_until_failure() {
        let today = date(2024, 1, 10);
        let mut a = daily_habit("A", "Health", date(2024, 1, 8));
        a.completed_dates = vec![date(2024, 1, 8), date(2024, 1, 9), today];
        let mut b = daily_habit("B", "Health", date(2024, 1, 9));
        b.completed_dates = vec![date(2024, 1, 9), today];

        // Jan 8: only A scheduled, completed. Jan 9 and 10: both completed.
        assert_eq!(current_streak(&[a, b], today), 3);
    }

    #[test]
    fn test_current_streak_zero_when_today_incomplete() {
        let today = date(2024, 1, 10);
        let mut h = daily_habit("A", "Health", date(2024, 1, 8));
        h.completed_dates = vec![date(2024, 1, 8), date(2024, 1, 9)];

        assert_eq!(current_streak(&[h], today), 0);
    }

    #[test]
    fn test_current_streak_zero_without_scheduled_habits() {
        assert_eq!(current_streak(&[], date(2024, 1, 10)), 0);
    }

    #[test]
    fn test_stats_by_category_sorted_and_filtered() {
        let today = date(2024, 1, 10);
        let mut health = daily_habit("Run", "Health", today);
        health.completed_dates.push(today);
        let mind = daily_habit("Read", "Mind", today);

        let categories = vec![
            category("Health", "#22c55e"),
            category("Mind", "#3b82f6"),
            category("Empty", "#ef4444"),
            category("All", "#000000"),
        ];

        let stats = stats_by_category(&[health, mind], &categories, TimeRange::Last7Days, today);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Health");
        assert_eq!(stats[0].completion_rate, 100);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].color, "#22c55e");
        assert_eq!(stats[1].name, "Mind");
        assert_eq!(stats[1].completion_rate, 0);
    }

    #[test]
    fn test_daily_series_covers_every_window_day() {
        let today = date(2024, 1, 10);
        let mut h = daily_habit("Run", "Health", date(2024, 1, 9));
        h.completed_dates.push(date(2024, 1, 9));

        let series = daily_completion_series(&[h], TimeRange::Last7Days, today);

        assert_eq!(series.len(), 7);
        assert_eq!(series.first().unwrap().date, date(2024, 1, 4));
        assert_eq!(series.last().unwrap().date, today);

        // Before the start date nothing is scheduled
        assert_eq!(series[0].total, 0);
        assert_eq!(series[0].rate, 0);
        // Jan 9 completed, Jan 10 pending
        assert_eq!(series[5].rate, 100);
        assert_eq!(series[6].rate, 0);
    }

    #[test]
    fn test_best_and_worst_aggregate_by_title() {
        let today = date(2024, 1, 10);
        let mut good = daily_habit("Run", "Health", date(2024, 1, 9));
        good.completed_dates = vec![date(2024, 1, 9), today];
        let mut mixed = daily_habit("Read", "Mind", date(2024, 1, 9));
        mixed.completed_dates = vec![date(2024, 1, 9)];
        let bad = daily_habit("Meditate", "Mind", date(2024, 1, 9));

        let rankings = best_and_worst_habits(&[good, mixed, bad], TimeRange::Last7Days, today);

        assert_eq!(rankings.best[0].title, "Run");
        assert_eq!(rankings.best[0].completion_rate, 100);
        assert_eq!(rankings.worst[0].title, "Meditate");
        assert_eq!(rankings.worst[0].completion_rate, 0);
    }

    #[test]
    fn test_best_and_worst_no_padding_below_three_titles() {
        let today = date(2024, 1, 10);
        let h = daily_habit("Run", "Health", today);

        let rankings = best_and_worst_habits(&[h], TimeRange::Last7Days, today);

        assert_eq!(rankings.best.len(), 1);
        assert_eq!(rankings.worst.len(), 1);
        // Degenerate small-N overlap is accepted
        assert_eq!(rankings.best[0].title, rankings.worst[0].title);
    }
}
