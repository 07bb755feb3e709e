use actix_web::{web, HttpResponse};
use chrono::Datelike;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::local_today;
use crate::db;
use crate::domain::calendar::{
    build_month, first_of_month, format_duration, index_by_date, paginate, CalendarMonth, Page,
    RECENT_PAGE_SIZE,
};
use crate::domain::stats::{compute_stats, WorkoutStats};
use crate::errors::AppError;
use crate::models::workout::WorkoutDate;
use crate::utils::jwt::OwnerId;

/// `month` is 0-based (0 = January). Both default to the current month.
#[derive(Deserialize)]
pub struct CalendarQuery {
    year: Option<i32>,
    month: Option<u32>,
    page: Option<usize>,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct RecentWorkout {
    #[serde(flatten)]
    workout: WorkoutDate,
    duration_label: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CalendarResponse {
    calendar: CalendarMonth,
    month_workouts: usize,
    stats: WorkoutStats,
    recent: Page<RecentWorkout>,
}

// GET /v1/calendar
pub async fn get_calendar(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let today = local_today();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month0());

    // Reject bad coordinates before touching the database
    first_of_month(year, month)?;

    // Read failures degrade to an empty calendar
    let workouts = db::workouts::list_summaries(&pool, owner.0)
        .await
        .unwrap_or_else(|err| {
            error!("Failed to load workouts for {}: {}", owner.0, err);
            Vec::new()
        });

    let calendar = build_month(year, month, &index_by_date(&workouts), today)?;
    let month_workouts = workouts
        .iter()
        .filter(|w| w.workout_date.year() == year && w.workout_date.month0() == month)
        .count();
    let dates: Vec<_> = workouts.iter().map(|w| w.workout_date).collect();

    let recent: Vec<RecentWorkout> = workouts
        .into_iter()
        .map(|workout| RecentWorkout {
            duration_label: format_duration(workout.duration_seconds),
            workout,
        })
        .collect();

    Ok(HttpResponse::Ok().json(CalendarResponse {
        calendar,
        month_workouts,
        stats: compute_stats(&dates, today),
        recent: paginate(&recent, query.page.unwrap_or(1), RECENT_PAGE_SIZE),
    }))
}
