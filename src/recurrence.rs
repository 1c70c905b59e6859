//! Pure recurrence utilities: "does habit H occur on date D?" and
//! occurrence generation over a date range.
//!
//! Day-of-week numbering is 0 = Sunday. Dates are naive local calendar
//! dates; callers resolve "today" and pass it in explicitly.

use chrono::{Datelike, Days, NaiveDate};

use crate::models::habit::{Frequency, Habit};
use crate::validation::WEEKDAY_ABBREVS;

/// Day-of-week index of a date, 0 = Sunday
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Weekday abbreviation of a date (`Sun`..`Sat`)
pub fn weekday_abbrev(date: NaiveDate) -> &'static str {
    WEEKDAY_ABBREVS[weekday_index(date) as usize]
}

fn parse_weekday(entry: &str) -> Option<u32> {
    WEEKDAY_ABBREVS
        .iter()
        .position(|&abbrev| abbrev == entry)
        .map(|i| i as u32)
}

fn parse_day_of_month(entry: &str) -> Option<u32> {
    entry.parse::<u32>().ok().filter(|n| (1..=31).contains(n))
}

/// Weekday indices selected for a weekly rule. Unparseable entries are
/// ignored; a set with no usable entry falls back to the start date's
/// weekday so the rule never yields zero occurrences.
fn selected_weekdays(selected_days: &[String], start_date: NaiveDate) -> Vec<u32> {
    let mut days: Vec<u32> = selected_days
        .iter()
        .filter_map(|entry| parse_weekday(entry))
        .collect();
    days.dedup();
    if days.is_empty() {
        days.push(weekday_index(start_date));
    }
    days
}

/// Days of month selected for a monthly rule, with the same fallback to
/// the start date's day-of-month.
fn selected_days_of_month(selected_days: &[String], start_date: NaiveDate) -> Vec<u32> {
    let mut days: Vec<u32> = selected_days
        .iter()
        .filter_map(|entry| parse_day_of_month(entry))
        .collect();
    days.dedup();
    if days.is_empty() {
        days.push(start_date.day());
    }
    days
}

/// Whether a frequency rule places an occurrence on `date`
///
/// Monthly habits occur on every day-of-month in the selected set, not
/// only on the start date's day.
pub fn occurs_on(
    date: NaiveDate,
    start_date: NaiveDate,
    frequency: Frequency,
    selected_days: &[String],
) -> bool {
    if date < start_date {
        return false;
    }
    match frequency {
        Frequency::Daily => true,
        Frequency::Weekly => {
            selected_weekdays(selected_days, start_date).contains(&weekday_index(date))
        }
        Frequency::Monthly => {
            selected_days_of_month(selected_days, start_date).contains(&date.day())
        }
    }
}

/// Whether habit `habit` is scheduled on `date`
pub fn should_occur_on_date(habit: &Habit, date: NaiveDate) -> bool {
    occurs_on(date, habit.start_date, habit.frequency, &habit.selected_days)
}

/// All occurrence dates of a frequency rule in `[start, end]`, ascending
/// and inclusive of both ends. Empty when `end < start`. Pure function
/// of its inputs.
pub fn generate_occurrences(
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
    selected_days: &[String],
) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    let mut occurrences = Vec::new();
    let mut date = start;
    while date <= end {
        if occurs_on(date, start, frequency, selected_days) {
            occurrences.push(date);
        }
        match date.checked_add_days(Days::new(1)) {
            Some(next) => date = next,
            None => break,
        }
    }
    occurrences
}

/// Recompute a habit's current streak by walking scheduled dates
/// backward from `today`.
///
/// An incomplete *today* is pending rather than streak-breaking; the
/// first incomplete scheduled day before today ends the walk. The walk
/// is bounded by the habit's start date.
pub fn streak_for_habit(habit: &Habit, today: NaiveDate) -> i32 {
    let mut streak = 0;
    let mut date = today;
    while date >= habit.start_date {
        if should_occur_on_date(habit, date) {
            if habit.completed_dates.contains(&date) {
                streak += 1;
            } else if date != today {
                break;
            }
        }
        match date.checked_sub_days(Days::new(1)) {
            Some(prev) => date = prev,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(frequency: Frequency, selected_days: &[&str], start: NaiveDate) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Test habit".to_string(),
            category: "Health".to_string(),
            frequency,
            selected_days: selected_days.iter().map(|s| s.to_string()).collect(),
            start_date: start,
            completed_dates: Vec::new(),
            current_streak: 0,
            best_streak: 0,
            total_completions: 0,
            enable_reminder: false,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn test_daily_occurs_on_every_date_from_start() {
        let h = habit(Frequency::Daily, &[], date(2024, 1, 15));
        assert!(should_occur_on_date(&h, date(2024, 1, 15)));
        assert!(should_occur_on_date(&h, date(2024, 3, 1)));
        assert!(!should_occur_on_date(&h, date(2024, 1, 14)));
    }

    #[test]
    fn test_weekly_occurs_on_selected_weekdays() {
        // 2024-01-15 is a Monday
        let monday = date(2024, 1, 15);
        let h = habit(Frequency::Weekly, &["Mon", "Wed", "Fri"], monday);

        assert!(should_occur_on_date(&h, monday));
        assert!(!should_occur_on_date(&h, date(2024, 1, 16))); // Tuesday
        assert!(should_occur_on_date(&h, date(2024, 1, 17))); // Wednesday
    }

    #[test]
    fn test_weekly_empty_set_falls_back_to_start_weekday() {
        let monday = date(2024, 1, 15);
        let h = habit(Frequency::Weekly, &[], monday);

        assert!(should_occur_on_date(&h, monday));
        assert!(should_occur_on_date(&h, date(2024, 1, 22))); // next Monday
        assert!(!should_occur_on_date(&h, date(2024, 1, 16)));
    }

    #[test]
    fn test_monthly_occurs_on_every_selected_day_of_month() {
        let h = habit(Frequency::Monthly, &["1", "15"], date(2024, 1, 1));

        assert!(should_occur_on_date(&h, date(2024, 1, 1)));
        assert!(should_occur_on_date(&h, date(2024, 1, 15)));
        assert!(should_occur_on_date(&h, date(2024, 2, 15)));
        assert!(!should_occur_on_date(&h, date(2024, 1, 20)));
    }

    #[test]
    fn test_monthly_unparseable_set_falls_back_to_start_day() {
        let h = habit(Frequency::Monthly, &["not-a-day"], date(2024, 1, 12));

        assert!(should_occur_on_date(&h, date(2024, 2, 12)));
        assert!(!should_occur_on_date(&h, date(2024, 2, 13)));
    }

    #[test]
    fn test_generate_occurrences_daily_count_and_order() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 10);
        let occurrences = generate_occurrences(start, end, Frequency::Daily, &[]);

        assert_eq!(occurrences.len(), 10);
        assert_eq!(occurrences.first(), Some(&start));
        assert_eq!(occurrences.last(), Some(&end));
        for pair in occurrences.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
        }
    }

    #[test]
    fn test_generate_occurrences_is_deterministic() {
        let start = date(2024, 1, 1);
        let end = date(2024, 3, 31);
        let days = vec!["Tue".to_string(), "Thu".to_string()];

        let first = generate_occurrences(start, end, Frequency::Weekly, &days);
        let second = generate_occurrences(start, end, Frequency::Weekly, &days);
        assert_eq!(first, second);
        assert!(first.iter().all(|d| matches!(weekday_index(*d), 2 | 4)));
    }

    #[test]
    fn test_generate_occurrences_empty_when_end_before_start() {
        let occurrences =
            generate_occurrences(date(2024, 1, 10), date(2024, 1, 1), Frequency::Daily, &[]);
        assert!(occurrences.is_empty());
    }

    #[test]
    fn test_generate_occurrences_ignores_unparseable_entries() {
        let days = vec!["Mon".to_string(), "garbage".to_string()];
        let occurrences =
            generate_occurrences(date(2024, 1, 15), date(2024, 1, 28), Frequency::Weekly, &days);
        // Two Mondays in range, the garbage entry contributes nothing
        assert_eq!(occurrences, vec![date(2024, 1, 15), date(2024, 1, 22)]);
    }

    #[test]
    fn test_streak_counts_consecutive_completed_days() {
        let mut h = habit(Frequency::Daily, &[], date(2024, 1, 1));
        h.completed_dates = vec![date(2024, 1, 8), date(2024, 1, 9), date(2024, 1, 10)];

        assert_eq!(streak_for_habit(&h, date(2024, 1, 10)), 3);
    }

    #[test]
    fn test_streak_incomplete_today_is_pending() {
        let mut h = habit(Frequency::Daily, &[], date(2024, 1, 1));
        h.completed_dates = vec![date(2024, 1, 8), date(2024, 1, 9)];

        // Today (Jan 10) not yet completed: streak from the prior days survives
        assert_eq!(streak_for_habit(&h, date(2024, 1, 10)), 2);
    }

    #[test]
    fn test_streak_breaks_on_missed_scheduled_day() {
        let mut h = habit(Frequency::Daily, &[], date(2024, 1, 1));
        h.completed_dates = vec![date(2024, 1, 7), date(2024, 1, 9), date(2024, 1, 10)];

        // Jan 8 was scheduled and missed
        assert_eq!(streak_for_habit(&h, date(2024, 1, 10)), 2);
    }

    #[test]
    fn test_streak_skips_unscheduled_days() {
        // Weekly Mon/Wed habit: Tuesday does not break the streak
        let monday = date(2024, 1, 15);
        let mut h = habit(Frequency::Weekly, &["Mon", "Wed"], monday);
        h.completed_dates = vec![monday, date(2024, 1, 17)];

        assert_eq!(streak_for_habit(&h, date(2024, 1, 18)), 2);
    }

    #[test]
    fn test_streak_recompute_handles_non_adjacent_uncompletion() {
        let mut h = habit(Frequency::Daily, &[], date(2024, 1, 1));
        h.completed_dates = vec![
            date(2024, 1, 6),
            date(2024, 1, 7),
            date(2024, 1, 8),
            date(2024, 1, 9),
            date(2024, 1, 10),
        ];
        assert_eq!(streak_for_habit(&h, date(2024, 1, 10)), 5);

        // Undo an earlier, non-adjacent day: streak shrinks to the days after it
        h.completed_dates.retain(|d| *d != date(2024, 1, 7));
        assert_eq!(streak_for_habit(&h, date(2024, 1, 10)), 3);
    }
}
