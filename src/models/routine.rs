use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::exercise::ExerciseType;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTemplate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTemplateExercise {
    pub id: Uuid,
    pub routine_template_id: Uuid,
    pub name: String,
    pub media_url: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub order_index: i32,
    pub exercise_type: ExerciseType,
    pub duration_seconds: Option<i32>,
}

/// A template with its exercises sorted by `order_index`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTemplateView {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<RoutineTemplateExercise>,
}
