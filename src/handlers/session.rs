use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::local_today;
use crate::db;
use crate::domain::session::{SetField, SetRecord, WorkoutSession};
use crate::errors::AppError;
use crate::store::SessionStore;
use crate::utils::jwt::OwnerId;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    template_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct UpdateSetRequest {
    field: SetField,
    value: Value,
}

#[derive(Deserialize, Validate, Debug)]
pub struct FinishSessionRequest {
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    notes: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetsResponse {
    exercise_id: Uuid,
    sets: Vec<SetRecord>,
}

// Numbers and strings are both accepted; anything else parses as 0.
fn raw_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

// POST /v1/sessions
pub async fn start_session(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionStore>,
    payload: web::Json<StartSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let template = db::routines::find(&pool, owner.0, payload.template_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Routine not found".to_string()))?;

    let now = Utc::now();
    let session = WorkoutSession::start(owner.0, template, now);
    let view = session.view(now);
    sessions.insert(session);
    info!("Started session {} from routine {} for {}", view.id, view.template_id, owner.0);

    Ok(HttpResponse::Created().json(view))
}

// GET /v1/sessions/:sessionId
pub async fn get_session(
    owner: OwnerId,
    sessions: web::Data<SessionStore>,
    session_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = sessions.with(*session_id, owner.0, |session| Ok(session.view(Utc::now())))?;
    Ok(HttpResponse::Ok().json(view))
}

// POST /v1/sessions/:sessionId/exercises/:exerciseId/sets
pub async fn add_set(
    owner: OwnerId,
    sessions: web::Data<SessionStore>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (session_id, exercise_id) = path.into_inner();

    let sets = sessions.with(session_id, owner.0, |session| {
        session.add_set(exercise_id).map(<[SetRecord]>::to_vec)
    })?;
    Ok(HttpResponse::Created().json(SetsResponse { exercise_id, sets }))
}

// PATCH /v1/sessions/:sessionId/exercises/:exerciseId/sets/:index
pub async fn update_set(
    owner: OwnerId,
    sessions: web::Data<SessionStore>,
    path: web::Path<(Uuid, Uuid, usize)>,
    payload: web::Json<UpdateSetRequest>,
) -> Result<HttpResponse, AppError> {
    let (session_id, exercise_id, index) = path.into_inner();
    let value = raw_value(&payload.value);

    let set = sessions.with(session_id, owner.0, |session| {
        session.update_set(exercise_id, index, payload.field, &value)
    })?;
    Ok(HttpResponse::Ok().json(set))
}

// DELETE /v1/sessions/:sessionId/exercises/:exerciseId/sets/:index
pub async fn remove_set(
    owner: OwnerId,
    sessions: web::Data<SessionStore>,
    path: web::Path<(Uuid, Uuid, usize)>,
) -> Result<HttpResponse, AppError> {
    let (session_id, exercise_id, index) = path.into_inner();

    let sets = sessions.with(session_id, owner.0, |session| {
        session.remove_set(exercise_id, index).map(<[SetRecord]>::to_vec)
    })?;
    Ok(HttpResponse::Ok().json(SetsResponse { exercise_id, sets }))
}

// POST /v1/sessions/:sessionId/finish
pub async fn finish_session(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionStore>,
    session_id: web::Path<Uuid>,
    payload: web::Json<FinishSessionRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;

    // Taken out first so a double submit cannot record the workout twice
    let session = sessions.take(*session_id, owner.0)?;
    let plan = session.finish(payload.notes.as_deref(), Utc::now(), local_today());

    let workout_id = match db::workouts::insert_plan(&pool, owner.0, &plan).await {
        Ok(workout_id) => workout_id,
        Err(err) => {
            error!("Failed to save session {}: {}", session.id, err);
            sessions.restore(session);
            return Err(AppError::InternalServerError(
                "Failed to save the workout, please try again".to_string(),
            ));
        }
    };
    info!(
        "Finished session {} as workout {} ({}s) for {}",
        session.id,
        workout_id,
        plan.workout.duration_seconds.unwrap_or(0),
        owner.0
    );

    Ok(HttpResponse::Created().json(json!({
        "id": workout_id,
        "durationSeconds": plan.workout.duration_seconds,
    })))
}

// DELETE /v1/sessions/:sessionId
pub async fn cancel_session(
    owner: OwnerId,
    sessions: web::Data<SessionStore>,
    session_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    sessions.discard(*session_id, owner.0)?;
    info!("Cancelled session {} for {}", *session_id, owner.0);

    Ok(HttpResponse::Ok().json(json!({ "message": "Session cancelled" })))
}
