use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{Exercise, ExerciseType, Progress};

/// Number of weeks shown in the progress reports
pub const REPORT_WEEKS: usize = 8;
/// Number of months shown in the platform usage report
pub const REPORT_MONTHS: usize = 6;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekBucket {
    pub label: String,
    pub workouts: usize,
    pub avg_effort: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivitySummary {
    pub period: String,
    pub total_workouts: usize,
    pub total_minutes: f64,
    pub avg_effort: Option<f64>,
    pub routines_completed: usize,
}

/// Workouts logged in the seven days before `now`
pub fn weekly_workouts(progress: &[Progress], now: DateTime<Utc>) -> usize {
    let since = now - Duration::days(7);
    progress
        .iter()
        .filter(|entry| entry.date > since && entry.date <= now)
        .count()
}

/// Consecutive active days ending today. A streak still counts when
/// today has no entry yet but yesterday does.
pub fn current_streak(progress: &[Progress], today: NaiveDate) -> u32 {
    let active: HashSet<NaiveDate> = progress.iter().map(|entry| entry.date.date_naive()).collect();

    let mut day = if active.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if active.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while active.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Workouts and average effort per week, oldest week first
pub fn weekly_buckets(progress: &[Progress], now: DateTime<Utc>, weeks: usize) -> Vec<WeekBucket> {
    (0..weeks)
        .map(|index| {
            let weeks_back = (weeks - index) as i64;
            let start = now - Duration::weeks(weeks_back);
            let end = now - Duration::weeks(weeks_back - 1);

            let entries: Vec<&Progress> = progress
                .iter()
                .filter(|entry| entry.date > start && entry.date <= end)
                .collect();

            WeekBucket {
                label: format!("Week {}", index + 1),
                workouts: entries.len(),
                avg_effort: average(entries.iter().filter_map(|entry| entry.effort_level)),
            }
        })
        .collect()
}

/// Logged entries per exercise type, counting entries that name an exercise
pub fn type_distribution(
    progress: &[Progress],
    exercises: &HashMap<String, Exercise>,
) -> Vec<(ExerciseType, usize)> {
    let mut counts: HashMap<ExerciseType, usize> = HashMap::new();
    for entry in progress {
        let exercise_type = entry
            .exercise_id
            .as_ref()
            .and_then(|id| exercises.get(id))
            .map(|exercise| exercise.exercise_type);
        if let Some(exercise_type) = exercise_type {
            *counts.entry(exercise_type).or_default() += 1;
        }
    }

    ExerciseType::ALL
        .iter()
        .map(|exercise_type| (*exercise_type, counts.get(exercise_type).copied().unwrap_or(0)))
        .collect()
}

/// Totals for the calendar month containing `now`
pub fn activity_summary(progress: &[Progress], now: DateTime<Utc>) -> ActivitySummary {
    let entries: Vec<&Progress> = progress
        .iter()
        .filter(|entry| same_month(entry.date, now))
        .collect();

    let total_seconds: f64 = entries.iter().filter_map(|entry| entry.duration).sum();
    let routines: HashSet<&str> = entries
        .iter()
        .filter_map(|entry| entry.routine_id.as_deref())
        .collect();

    ActivitySummary {
        period: now.format("%B %Y").to_string(),
        total_workouts: entries.len(),
        total_minutes: (total_seconds / 60.0 * 10.0).round() / 10.0,
        avg_effort: average(entries.iter().filter_map(|entry| entry.effort_level)),
        routines_completed: routines.len(),
    }
}

/// Lifetime totals for one user's progress log
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressTotals {
    pub total_workouts: usize,
    pub avg_effort: Option<f64>,
    pub total_minutes: f64,
    pub last_workout: Option<DateTime<Utc>>,
}

pub fn progress_totals(progress: &[Progress]) -> ProgressTotals {
    let total_seconds: f64 = progress.iter().filter_map(|entry| entry.duration).sum();
    ProgressTotals {
        total_workouts: progress.len(),
        avg_effort: average(progress.iter().filter_map(|entry| entry.effort_level)),
        total_minutes: (total_seconds / 60.0 * 10.0).round() / 10.0,
        last_workout: progress.iter().map(|entry| entry.date).max(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthBucket {
    pub label: String,
    pub active_users: usize,
    pub workouts: usize,
}

/// Distinct users logging progress per calendar month, oldest month first
pub fn monthly_activity(progress: &[Progress], now: DateTime<Utc>, months: usize) -> Vec<MonthBucket> {
    let current = now.year() * 12 + now.month0() as i32;
    (0..months)
        .map(|index| {
            let month = current - (months - 1 - index) as i32;
            let (year, month0) = (month.div_euclid(12), month.rem_euclid(12) as u32);

            let entries: Vec<&Progress> = progress
                .iter()
                .filter(|entry| entry.date.year() == year && entry.date.month0() == month0)
                .collect();
            let users: HashSet<&str> = entries.iter().map(|entry| entry.user_id.as_str()).collect();

            MonthBucket {
                label: NaiveDate::from_ymd_opt(year, month0 + 1, 1)
                    .map(|first| first.format("%b %Y").to_string())
                    .unwrap_or_default(),
                active_users: users.len(),
                workouts: entries.len(),
            }
        })
        .collect()
}

/// Groups people are counted under on the admin reports
pub const ROLE_GROUPS: [&str; 3] = ["Students", "Employees", "Trainers"];

/// Progress entries per role group. `groups` maps usernames to one of
/// `ROLE_GROUPS`; entries from anyone else are left out.
pub fn activity_by_group(
    progress: &[Progress],
    groups: &HashMap<String, &'static str>,
) -> Vec<(&'static str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in progress {
        if let Some(group) = groups.get(&entry.user_id) {
            *counts.entry(*group).or_default() += 1;
        }
    }

    ROLE_GROUPS
        .iter()
        .map(|group| (*group, counts.get(group).copied().unwrap_or(0)))
        .collect()
}

/// Percent growth from the `added` items on top of what existed before.
/// `None` when there was nothing before.
pub fn growth_percent(total: i64, added: i64) -> Option<f64> {
    let before = total - added;
    if before <= 0 {
        return None;
    }
    Some((added as f64 / before as f64 * 1000.0).round() / 10.0)
}

pub fn same_month(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    date.year() == now.year() && date.month() == now.month()
}

fn average(values: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0usize), |(sum, count), value| (sum + value as i64, count + 1));
    if count == 0 {
        return None;
    }
    Some(((sum as f64 / count as f64) * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 18, 18, 0, 0).unwrap()
    }

    fn entry(days_ago: i64, effort: Option<i32>) -> Progress {
        let date = now() - Duration::days(days_ago);
        Progress {
            user_id: "laura.h".to_string(),
            routine_id: None,
            exercise_id: None,
            date,
            repetitions: None,
            duration: None,
            effort_level: effort,
            notes: None,
            created_at: date,
        }
    }

    fn exercise(exercise_type: ExerciseType) -> Exercise {
        Exercise {
            name: "Demo".to_string(),
            exercise_type,
            description: None,
            duration: None,
            difficulty: None,
            video_url: None,
            created_by: "system".to_string(),
            created_at: now(),
        }
    }

    #[test]
    fn test_weekly_workouts_counts_last_seven_days() {
        let progress = vec![entry(0, None), entry(3, None), entry(6, None), entry(7, None), entry(12, None)];
        assert_eq!(weekly_workouts(&progress, now()), 3);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let today = now().date_naive();
        let progress = vec![entry(0, None), entry(1, None), entry(1, None), entry(2, None), entry(4, None)];
        assert_eq!(current_streak(&progress, today), 3);
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        let today = now().date_naive();
        let progress = vec![entry(1, None), entry(2, None)];
        assert_eq!(current_streak(&progress, today), 2);
    }

    #[test]
    fn test_streak_broken() {
        let today = now().date_naive();
        assert_eq!(current_streak(&[entry(2, None), entry(3, None)], today), 0);
        assert_eq!(current_streak(&[], today), 0);
    }

    #[test]
    fn test_weekly_buckets_oldest_first() {
        let progress = vec![entry(1, Some(8)), entry(2, Some(6)), entry(9, Some(5)), entry(60, Some(9))];
        let buckets = weekly_buckets(&progress, now(), REPORT_WEEKS);

        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[0].label, "Week 1");
        assert_eq!(buckets[7].workouts, 2);
        assert_eq!(buckets[7].avg_effort, Some(7.0));
        assert_eq!(buckets[6].workouts, 1);
        assert_eq!(buckets[6].avg_effort, Some(5.0));
        assert_eq!(buckets[0].workouts, 0);
        assert_eq!(buckets[0].avg_effort, None);
        assert_eq!(buckets.iter().map(|b| b.workouts).sum::<usize>(), 3);
    }

    #[test]
    fn test_type_distribution() {
        let mut exercises = HashMap::new();
        exercises.insert("run".to_string(), exercise(ExerciseType::Cardio));
        exercises.insert("squat".to_string(), exercise(ExerciseType::Strength));

        let mut progress = vec![entry(0, None), entry(1, None), entry(2, None), entry(3, None)];
        progress[0].exercise_id = Some("run".to_string());
        progress[1].exercise_id = Some("run".to_string());
        progress[2].exercise_id = Some("squat".to_string());
        progress[3].exercise_id = Some("deleted".to_string());

        assert_eq!(
            type_distribution(&progress, &exercises),
            vec![
                (ExerciseType::Cardio, 2),
                (ExerciseType::Strength, 1),
                (ExerciseType::Mobility, 0)
            ]
        );
    }

    #[test]
    fn test_activity_summary_for_current_month() {
        let mut progress = vec![entry(1, Some(7)), entry(2, Some(8)), entry(3, None), entry(40, Some(2))];
        progress[0].duration = Some(1800.0);
        progress[1].duration = Some(900.0);
        progress[0].routine_id = Some("r1".to_string());
        progress[1].routine_id = Some("r1".to_string());
        progress[2].routine_id = Some("r2".to_string());

        let summary = activity_summary(&progress, now());

        assert_eq!(
            summary,
            ActivitySummary {
                period: "October 2024".to_string(),
                total_workouts: 3,
                total_minutes: 45.0,
                avg_effort: Some(7.5),
                routines_completed: 2,
            }
        );
    }

    #[test]
    fn test_progress_totals() {
        let mut progress = vec![entry(5, Some(6)), entry(1, Some(9)), entry(3, None)];
        progress[0].duration = Some(600.0);
        progress[1].duration = Some(1200.0);

        assert_eq!(
            progress_totals(&progress),
            ProgressTotals {
                total_workouts: 3,
                avg_effort: Some(7.5),
                total_minutes: 30.0,
                last_workout: Some(now() - Duration::days(1)),
            }
        );
        assert_eq!(progress_totals(&[]).last_workout, None);
    }

    #[test]
    fn test_monthly_activity_crosses_the_year() {
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 12, 0, 0).unwrap();
        let at = |month: u32, year: i32, user: &str| {
            let mut progress = entry(0, None);
            progress.date = Utc.with_ymd_and_hms(year, month, 3, 9, 0, 0).unwrap();
            progress.user_id = user.to_string();
            progress
        };
        let progress = vec![at(2, 2025, "ana"), at(2, 2025, "ana"), at(2, 2025, "luis"), at(12, 2024, "ana"), at(1, 2024, "old")];

        let months = monthly_activity(&progress, now, REPORT_MONTHS);

        assert_eq!(months.len(), 6);
        assert_eq!(months[0].label, "Sep 2024");
        assert_eq!(months[3].label, "Dec 2024");
        assert_eq!(months[3].active_users, 1);
        assert_eq!(months[5].label, "Feb 2025");
        assert_eq!(months[5].active_users, 2);
        assert_eq!(months[5].workouts, 3);
        assert_eq!(months.iter().map(|m| m.workouts).sum::<usize>(), 4);
    }

    #[test]
    fn test_growth_percent() {
        assert_eq!(growth_percent(12, 2), Some(20.0));
        assert_eq!(growth_percent(3, 3), None);
        assert_eq!(growth_percent(0, 0), None);
    }

    #[test]
    fn test_activity_by_group_skips_unknown_users() {
        let mut groups = HashMap::new();
        groups.insert("ana".to_string(), ROLE_GROUPS[0]);
        groups.insert("diana".to_string(), ROLE_GROUPS[2]);

        let mut progress = vec![entry(0, None), entry(1, None), entry(2, None), entry(3, None)];
        progress[0].user_id = "ana".to_string();
        progress[1].user_id = "ana".to_string();
        progress[2].user_id = "diana".to_string();
        progress[3].user_id = "admin".to_string();

        assert_eq!(
            activity_by_group(&progress, &groups),
            vec![("Students", 2), ("Employees", 0), ("Trainers", 1)]
        );
    }
}
