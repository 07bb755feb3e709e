use serde::{Deserialize, Serialize};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef, Postgres};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::utils::validation::{require_text, validate_media_url};

/// How an exercise is measured. Timed exercises never carry a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    #[default]
    Weight,
    Time,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Weight => "weight",
            ExerciseType::Time => "time",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(ExerciseType::Weight),
            "time" => Ok(ExerciseType::Time),
            other => Err(format!("unknown exercise type: {}", other)),
        }
    }
}

// Stored as TEXT with a CHECK constraint rather than a Postgres enum.
impl sqlx::Type<Postgres> for ExerciseType {
    fn type_info() -> PgTypeInfo {
        <str as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <str as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for ExerciseType {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let raw = <&str as sqlx::Decode<Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}

impl sqlx::Encode<'_, Postgres> for ExerciseType {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
        <&str as sqlx::Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub name: String,
    pub media_url: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub order_index: i32,
    pub exercise_type: ExerciseType,
    pub duration_seconds: Option<i32>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub set_number: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i32>,
}

/// An exercise row ready to insert, under a workout or a routine template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    pub media_url: Option<String>,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub order_index: i32,
    pub exercise_type: ExerciseType,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExerciseSet {
    pub set_number: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i32>,
}

/// Exercise fields as entered by the user, for templates and manual workouts.
#[derive(Serialize, Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInput {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(custom = "validate_media_url")]
    pub media_url: Option<String>,

    #[validate(range(min = 1, max = 50, message = "Sets must be between 1 and 50"))]
    pub sets: i32,

    #[validate(range(min = 0, max = 1000, message = "Reps must be between 0 and 1000"))]
    pub reps: i32,

    #[validate(range(min = 0.0, max = 2000.0, message = "Weight must be between 0 and 2000"))]
    pub weight: Option<f64>,

    #[serde(default)]
    pub exercise_type: ExerciseType,

    #[validate(range(min = 0, max = 86400, message = "Duration must be between 0 and 86400 seconds"))]
    pub duration_seconds: Option<i32>,
}

impl ExerciseInput {
    /// Trims text fields and drops the measurement that does not apply to the type.
    pub fn to_new_exercise(&self, order_index: i32) -> Result<NewExercise, AppError> {
        let name = require_text(&self.name, "Exercise name")?;
        let media_url = self
            .media_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        let (weight, duration_seconds) = match self.exercise_type {
            ExerciseType::Weight => (Some(self.weight.unwrap_or(0.0)), None),
            ExerciseType::Time => (None, Some(self.duration_seconds.unwrap_or(0))),
        };

        Ok(NewExercise {
            name,
            media_url,
            sets: self.sets,
            reps: self.reps,
            weight,
            order_index,
            exercise_type: self.exercise_type,
            duration_seconds,
        })
    }
}
