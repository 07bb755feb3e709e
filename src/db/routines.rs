use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::template_editor::TemplateSavePlan;
use crate::models::exercise::NewExercise;
use crate::models::routine::{RoutineTemplate, RoutineTemplateExercise, RoutineTemplateView};

const EXERCISE_COLUMNS: &str =
    "id, routine_template_id, name, media_url, sets, reps, weight, order_index, exercise_type, duration_seconds";

async fn exercises_for(
    pool: &PgPool,
    template_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<RoutineTemplateExercise>>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RoutineTemplateExercise>(&format!(
        "SELECT {} FROM routine_template_exercises WHERE routine_template_id = ANY($1) ORDER BY order_index",
        EXERCISE_COLUMNS
    ))
    .bind(template_ids)
    .fetch_all(pool)
    .await?;

    let mut by_template: HashMap<Uuid, Vec<RoutineTemplateExercise>> = HashMap::new();
    for row in rows {
        by_template.entry(row.routine_template_id).or_default().push(row);
    }
    Ok(by_template)
}

fn into_view(template: RoutineTemplate, exercises: Vec<RoutineTemplateExercise>) -> RoutineTemplateView {
    RoutineTemplateView {
        id: template.id,
        name: template.name,
        created_at: template.created_at,
        exercises,
    }
}

/// All templates of `owner`, newest first.
pub async fn list(pool: &PgPool, owner: Uuid) -> Result<Vec<RoutineTemplateView>, sqlx::Error> {
    let templates = sqlx::query_as::<_, RoutineTemplate>(
        "SELECT id, user_id, name, created_at FROM routine_templates WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = templates.iter().map(|t| t.id).collect();
    let mut exercises = exercises_for(pool, &ids).await?;

    Ok(templates
        .into_iter()
        .map(|t| {
            let rows = exercises.remove(&t.id).unwrap_or_default();
            into_view(t, rows)
        })
        .collect())
}

pub async fn find(pool: &PgPool, owner: Uuid, template_id: Uuid) -> Result<Option<RoutineTemplateView>, sqlx::Error> {
    let template = sqlx::query_as::<_, RoutineTemplate>(
        "SELECT id, user_id, name, created_at FROM routine_templates WHERE id = $1 AND user_id = $2",
    )
    .bind(template_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    match template {
        Some(template) => {
            let rows = exercises_for(pool, &[template.id])
                .await?
                .remove(&template.id)
                .unwrap_or_default();
            Ok(Some(into_view(template, rows)))
        }
        None => Ok(None),
    }
}

async fn insert_exercises(
    tx: &mut Transaction<'_, Postgres>,
    template_id: Uuid,
    exercises: &[NewExercise],
) -> Result<(), sqlx::Error> {
    for exercise in exercises {
        sqlx::query(&format!(
            "INSERT INTO routine_template_exercises ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            EXERCISE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(template_id)
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
    }
    Ok(())
}

/// Persists a saved draft in one transaction and returns the template id.
///
/// For an existing template the name is updated and every exercise row is
/// deleted and re-inserted from the plan. `Ok(None)` means the template no
/// longer exists for this owner.
pub async fn save(pool: &PgPool, owner: Uuid, plan: &TemplateSavePlan) -> Result<Option<Uuid>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let template_id = match plan.template_id {
        Some(template_id) => {
            let updated = sqlx::query("UPDATE routine_templates SET name = $1 WHERE id = $2 AND user_id = $3")
                .bind(&plan.name)
                .bind(template_id)
                .bind(owner)
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(None);
            }

            sqlx::query("DELETE FROM routine_template_exercises WHERE routine_template_id = $1")
                .bind(template_id)
                .execute(&mut *tx)
                .await?;
            template_id
        }
        None => {
            let template_id = Uuid::new_v4();
            sqlx::query("INSERT INTO routine_templates (id, user_id, name, created_at) VALUES ($1, $2, $3, NOW())")
                .bind(template_id)
                .bind(owner)
                .bind(&plan.name)
                .execute(&mut *tx)
                .await?;
            template_id
        }
    };

    insert_exercises(&mut tx, template_id, &plan.exercises).await?;
    tx.commit().await?;
    Ok(Some(template_id))
}

/// Deletes the template; its exercises follow through the foreign key cascade.
pub async fn delete(pool: &PgPool, owner: Uuid, template_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM routine_templates WHERE id = $1 AND user_id = $2")
        .bind(template_id)
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
