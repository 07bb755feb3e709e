use actix_web::{web, HttpResponse};
use log::error;
use serde_json::json;
use sqlx::PgPool;

use crate::db;

// GET /health
pub async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match db::ping(&pool).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ok" })),
        Err(err) => {
            error!("Health check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
