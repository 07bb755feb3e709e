use actix_web::{web, HttpResponse};
use log::info;
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileUpdate};
use crate::utils::jwt::OwnerId;
use crate::utils::validation::{require_text, validate_payload};

// GET /v1/profile
pub async fn get_profile(
    owner: OwnerId,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    // A missing row just means no display name was chosen yet
    let profile = db::profiles::find(&pool, owner.0)
        .await?
        .unwrap_or(Profile {
            id: owner.0,
            display_name: None,
        });

    Ok(HttpResponse::Ok().json(profile))
}

// PATCH /v1/profile
pub async fn update_profile(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    // Validate payload
    validate_payload(&*payload)?;
    let display_name = require_text(&payload.display_name, "Display name")?;

    let profile = db::profiles::upsert_display_name(&pool, owner.0, &display_name).await?;
    info!("Updated display name for {}", owner.0);

    Ok(HttpResponse::Ok().json(profile))
}
