use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_days: usize,
    pub total_workouts: usize,
    pub this_month: usize,
    pub current_streak: u32,
}

/// Aggregates one owner's workout dates as seen on `today`.
///
/// `dates` holds one entry per workout row, so the same day may appear more
/// than once when several workouts were logged on it.
pub fn compute_stats(dates: &[NaiveDate], today: NaiveDate) -> WorkoutStats {
    let distinct: BTreeSet<NaiveDate> = dates.iter().copied().collect();

    WorkoutStats {
        total_days: distinct.len(),
        total_workouts: dates.len(),
        this_month: dates
            .iter()
            .filter(|d| d.year() == today.year() && d.month() == today.month())
            .count(),
        current_streak: streak_over(&distinct, today),
    }
}

/// Consecutive training days ending today or yesterday.
fn streak_over(distinct: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut newest_first = distinct.iter().rev();

    let latest = match newest_first.next() {
        Some(latest) => *latest,
        None => return 0,
    };
    if latest != today && latest != today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    let mut counted = latest;
    for date in newest_first {
        if *date != counted - Duration::days(1) {
            break;
        }
        streak += 1;
        counted = *date;
    }
    streak
}
