use actix_web::{web, HttpResponse};
use log::{error, info};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::local_today;
use crate::db;
use crate::errors::AppError;
use crate::models::workout::{normalize_notes, ManualWorkoutRequest, NewWorkout, PlannedExercise, WorkoutPlan};
use crate::utils::jwt::OwnerId;
use crate::utils::validation::{parse_iso_date, validate_payload};

// GET /v1/workouts
pub async fn list_workouts(
    owner: OwnerId,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let workouts = db::workouts::list_summaries(&pool, owner.0)
        .await
        .unwrap_or_else(|err| {
            error!("Failed to load workouts for {}: {}", owner.0, err);
            Vec::new()
        });

    Ok(HttpResponse::Ok().json(workouts))
}

// POST /v1/workouts
pub async fn create_workout(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    payload: web::Json<ManualWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    // Validate payload
    validate_payload(&*payload)?;

    let workout_date = match payload.workout_date.as_deref() {
        Some(date) => parse_iso_date(date)?,
        None => local_today(),
    };

    let exercises = payload
        .exercises
        .iter()
        .enumerate()
        .map(|(index, input)| {
            input.to_new_exercise(index as i32).map(|exercise| PlannedExercise {
                exercise,
                sets: Vec::new(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let plan = WorkoutPlan {
        workout: NewWorkout {
            workout_date,
            notes: normalize_notes(payload.notes.as_deref()),
            routine_name: None,
            duration_seconds: None,
        },
        exercises,
    };

    let workout_id = db::workouts::insert_plan(&pool, owner.0, &plan).await?;
    info!("Recorded manual workout {} for {}", workout_id, owner.0);

    Ok(HttpResponse::Created().json(json!({ "id": workout_id })))
}

// GET /v1/workouts/:workoutId
pub async fn get_workout(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    workout_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let workout = db::workouts::find_detail(&pool, owner.0, *workout_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;

    Ok(HttpResponse::Ok().json(workout))
}

// DELETE /v1/workouts/:workoutId
pub async fn delete_workout(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    workout_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !db::workouts::delete(&pool, owner.0, *workout_id).await? {
        return Err(AppError::NotFound("Workout not found".to_string()));
    }
    info!("Deleted workout {} for {}", *workout_id, owner.0);

    Ok(HttpResponse::Ok().json(json!({ "message": "Workout deleted successfully" })))
}
