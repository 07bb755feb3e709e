use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::exercise::{Exercise, ExerciseSet, NewExercise};
use crate::models::workout::{ExerciseDetail, Workout, WorkoutDate, WorkoutDetail, WorkoutPlan};

/// Summaries of every workout of `owner`, newest first.
pub async fn list_summaries(pool: &PgPool, owner: Uuid) -> Result<Vec<WorkoutDate>, sqlx::Error> {
    sqlx::query_as::<_, WorkoutDate>(
        "SELECT w.id, w.workout_date, w.notes, w.routine_name, w.duration_seconds, \
                COUNT(e.id) AS exercise_count \
         FROM workouts w \
         LEFT JOIN exercises e ON e.workout_id = w.id \
         WHERE w.user_id = $1 \
         GROUP BY w.id \
         ORDER BY w.workout_date DESC, w.created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await
}

pub async fn count_exercises(pool: &PgPool, owner: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM exercises e JOIN workouts w ON w.id = e.workout_id WHERE w.user_id = $1",
    )
    .bind(owner)
    .fetch_one(pool)
    .await
}

/// Exercises ordered by `order_index`, each with sets ordered by `set_number`.
pub async fn find_detail(pool: &PgPool, owner: Uuid, workout_id: Uuid) -> Result<Option<WorkoutDetail>, sqlx::Error> {
    let workout = sqlx::query_as::<_, Workout>(
        "SELECT id, user_id, workout_date, notes, routine_name, duration_seconds, created_at \
         FROM workouts WHERE id = $1 AND user_id = $2",
    )
    .bind(workout_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    let workout = match workout {
        Some(workout) => workout,
        None => return Ok(None),
    };

    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT id, workout_id, name, media_url, sets, reps, weight, order_index, exercise_type, duration_seconds \
         FROM exercises WHERE workout_id = $1 ORDER BY order_index",
    )
    .bind(workout.id)
    .fetch_all(pool)
    .await?;

    let exercise_ids: Vec<Uuid> = exercises.iter().map(|e| e.id).collect();
    let sets = sqlx::query_as::<_, ExerciseSet>(
        "SELECT id, exercise_id, set_number, reps, weight, duration_seconds \
         FROM exercise_sets WHERE exercise_id = ANY($1) ORDER BY set_number",
    )
    .bind(&exercise_ids)
    .fetch_all(pool)
    .await?;

    let mut sets_by_exercise: HashMap<Uuid, Vec<ExerciseSet>> = HashMap::new();
    for set in sets {
        sets_by_exercise.entry(set.exercise_id).or_default().push(set);
    }

    Ok(Some(WorkoutDetail {
        id: workout.id,
        workout_date: workout.workout_date,
        notes: workout.notes,
        routine_name: workout.routine_name,
        duration_seconds: workout.duration_seconds,
        exercises: exercises
            .into_iter()
            .map(|exercise| ExerciseDetail {
                exercise_sets: sets_by_exercise.remove(&exercise.id).unwrap_or_default(),
                exercise,
            })
            .collect(),
    }))
}

async fn insert_exercise(
    tx: &mut Transaction<'_, Postgres>,
    workout_id: Uuid,
    exercise: &NewExercise,
) -> Result<Uuid, sqlx::Error> {
    let exercise_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO exercises (id, workout_id, name, media_url, sets, reps, weight, order_index, exercise_type, duration_seconds) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(exercise_id)
    .bind(workout_id)
    .bind(&exercise.name)
    .bind(&exercise.media_url)
    .bind(exercise.sets)
    .bind(exercise.reps)
    .bind(exercise.weight)
    .bind(exercise.order_index)
    .bind(exercise.exercise_type)
    .bind(exercise.duration_seconds)
    .execute(&mut **tx)
    .await?;
    Ok(exercise_id)
}

/// Writes the workout, its exercises and their sets in one transaction.
pub async fn insert_plan(pool: &PgPool, owner: Uuid, plan: &WorkoutPlan) -> Result<Uuid, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let workout_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO workouts (id, user_id, workout_date, notes, routine_name, duration_seconds, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, NOW())",
    )
    .bind(workout_id)
    .bind(owner)
    .bind(plan.workout.workout_date)
    .bind(&plan.workout.notes)
    .bind(&plan.workout.routine_name)
    .bind(plan.workout.duration_seconds)
    .execute(&mut *tx)
    .await?;

    for planned in &plan.exercises {
        let exercise_id = insert_exercise(&mut tx, workout_id, &planned.exercise).await?;

        for set in &planned.sets {
            sqlx::query(
                "INSERT INTO exercise_sets (id, exercise_id, set_number, reps, weight, duration_seconds) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(exercise_id)
            .bind(set.set_number)
            .bind(set.reps)
            .bind(set.weight)
            .bind(set.duration_seconds)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(workout_id)
}

/// Deletes the workout; exercises and sets go with it through the foreign
/// key cascade. Returns false when the owner has no such workout.
pub async fn delete(pool: &PgPool, owner: Uuid, workout_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
        .bind(workout_id)
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
