use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::exercise::{Exercise, ExerciseInput, ExerciseSet, NewExercise, NewExerciseSet};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_date: NaiveDate,
    pub notes: Option<String>,
    pub routine_name: Option<String>,
    pub duration_seconds: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Per-workout summary used by the calendar, history list and stats.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDate {
    pub id: Uuid,
    pub workout_date: NaiveDate,
    pub notes: Option<String>,
    pub exercise_count: i64,
    pub routine_name: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDetail {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub exercise_sets: Vec<ExerciseSet>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDetail {
    pub id: Uuid,
    pub workout_date: NaiveDate,
    pub notes: Option<String>,
    pub routine_name: Option<String>,
    pub duration_seconds: Option<i32>,
    pub exercises: Vec<ExerciseDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub workout_date: NaiveDate,
    pub notes: Option<String>,
    pub routine_name: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedExercise {
    pub exercise: NewExercise,
    pub sets: Vec<NewExerciseSet>,
}

/// Everything written when a workout is recorded: the workout row, its
/// exercises in order and each exercise's sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub workout: NewWorkout,
    pub exercises: Vec<PlannedExercise>,
}

/// Body of a manually entered workout (no live session).
#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ManualWorkoutRequest {
    pub workout_date: Option<String>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,

    #[validate(length(min = 1, message = "Add at least one exercise"))]
    #[validate]
    pub exercises: Vec<ExerciseInput>,
}

/// Empty or whitespace-only notes are stored as NULL.
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}
