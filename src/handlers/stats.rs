use actix_web::{web, HttpResponse};
use log::error;
use serde::Serialize;
use sqlx::PgPool;

use super::local_today;
use crate::db;
use crate::domain::stats::{compute_stats, WorkoutStats};
use crate::errors::AppError;
use crate::utils::jwt::OwnerId;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(flatten)]
    stats: WorkoutStats,
    total_exercises: i64,
}

// GET /v1/stats
pub async fn get_stats(
    owner: OwnerId,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    // Read failures degrade to zeroed stats
    let workouts = db::workouts::list_summaries(&pool, owner.0)
        .await
        .unwrap_or_else(|err| {
            error!("Failed to load workouts for {}: {}", owner.0, err);
            Vec::new()
        });
    let total_exercises = db::workouts::count_exercises(&pool, owner.0)
        .await
        .unwrap_or_else(|err| {
            error!("Failed to count exercises for {}: {}", owner.0, err);
            0
        });

    let dates: Vec<_> = workouts.iter().map(|w| w.workout_date).collect();

    Ok(HttpResponse::Ok().json(StatsResponse {
        stats: compute_stats(&dates, local_today()),
        total_exercises,
    }))
}
