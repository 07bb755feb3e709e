//! Month grid for the training calendar.
//!
//! Months are 0-based (0 = January, 11 = December) on every interface of this
//! module. Weeks start on Monday.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::AppError;
use crate::models::workout::WorkoutDate;

pub const RECENT_PAGE_SIZE: usize = 5;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub day: u32,
    pub is_today: bool,
    pub has_workout: bool,
    pub workout: Option<WorkoutDate>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

/// Leading placeholders are `None`; there is no trailing padding.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: usize,
    pub cells: Vec<Option<DayCell>>,
    pub previous: MonthRef,
    pub next: MonthRef,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
}

/// ISO key for a calendar day, zero padded.
pub fn date_key(year: i32, month0: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month0 + 1, day)
}

/// Indexes summaries by ISO date. When a day has several workouts the first
/// one in `workouts` is kept, which is the newest for date-descending input.
pub fn index_by_date(workouts: &[WorkoutDate]) -> HashMap<String, WorkoutDate> {
    let mut map = HashMap::with_capacity(workouts.len());
    for workout in workouts {
        map.entry(workout.workout_date.format("%Y-%m-%d").to_string())
            .or_insert_with(|| workout.clone());
    }
    map
}

pub fn first_of_month(year: i32, month0: u32) -> Result<NaiveDate, AppError> {
    if month0 > 11 {
        return Err(AppError::BadRequest("Month must be between 0 and 11".to_string()));
    }
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .ok_or_else(|| AppError::BadRequest("Year is out of range".to_string()))
}

pub fn days_in_month(year: i32, month0: u32) -> Result<u32, AppError> {
    let first = first_of_month(year, month0)?;
    let next = shift_month(year, month0, 1);
    let days = match NaiveDate::from_ymd_opt(next.year, next.month + 1, 1) {
        Some(next_first) => (next_first - first).num_days() as u32,
        // December of the last representable year.
        None => 31,
    };
    Ok(days)
}

/// Moves `delta` months forward (or back when negative).
pub fn shift_month(year: i32, month0: u32, delta: i32) -> MonthRef {
    let total = year * 12 + month0 as i32 + delta;
    MonthRef {
        year: total.div_euclid(12),
        month: total.rem_euclid(12) as u32,
    }
}

pub fn build_month(
    year: i32,
    month0: u32,
    workouts: &HashMap<String, WorkoutDate>,
    today: NaiveDate,
) -> Result<CalendarMonth, AppError> {
    let first = first_of_month(year, month0)?;
    let leading_blanks = first.weekday().num_days_from_monday() as usize;
    let days = days_in_month(year, month0)?;

    let mut cells: Vec<Option<DayCell>> = Vec::with_capacity(leading_blanks + days as usize);
    cells.resize(leading_blanks, None);

    for day in 1..=days {
        let workout = workouts.get(&date_key(year, month0, day)).cloned();
        cells.push(Some(DayCell {
            day,
            is_today: today.year() == year && today.month0() == month0 && today.day() == day,
            has_workout: workout.is_some(),
            workout,
        }));
    }

    Ok(CalendarMonth {
        year,
        month: month0,
        leading_blanks,
        cells,
        previous: shift_month(year, month0, -1),
        next: shift_month(year, month0, 1),
    })
}

/// 1-based pagination; out-of-range pages are clamped.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * per_page;

    Page {
        items: items.iter().skip(start).take(per_page).cloned().collect(),
        page,
        total_pages,
    }
}

/// Renders seconds as `m:ss`, or `h:mm:ss` from one hour on. Zero or missing
/// durations render as nothing.
pub fn format_duration(seconds: Option<i32>) -> Option<String> {
    let seconds = seconds.filter(|s| *s > 0)?;
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hrs > 0 {
        Some(format!("{}:{:02}:{:02}", hrs, mins, secs))
    } else {
        Some(format!("{}:{:02}", mins, secs))
    }
}
