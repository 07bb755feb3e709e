use actix_web::{web, HttpResponse};
use log::{error, info};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::utils::jwt::OwnerId;

// GET /v1/routines
pub async fn list_routines(
    owner: OwnerId,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let routines = db::routines::list(&pool, owner.0)
        .await
        .unwrap_or_else(|err| {
            error!("Failed to load routines for {}: {}", owner.0, err);
            Vec::new()
        });

    Ok(HttpResponse::Ok().json(routines))
}

// GET /v1/routines/:routineId
pub async fn get_routine(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    routine_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let routine = db::routines::find(&pool, owner.0, *routine_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Routine not found".to_string()))?;

    Ok(HttpResponse::Ok().json(routine))
}

// DELETE /v1/routines/:routineId
pub async fn delete_routine(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    routine_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !db::routines::delete(&pool, owner.0, *routine_id).await? {
        return Err(AppError::NotFound("Routine not found".to_string()));
    }
    info!("Deleted routine {} for {}", *routine_id, owner.0);

    Ok(HttpResponse::Ok().json(json!({ "message": "Routine deleted successfully" })))
}
