use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db;
use crate::domain::template_editor::TemplateDraft;
use crate::errors::AppError;
use crate::models::exercise::ExerciseInput;
use crate::store::TemplateDraftStore;
use crate::utils::jwt::OwnerId;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OpenDraftRequest {
    template_id: Option<Uuid>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct RenameDraftRequest {
    #[validate(length(max = 100, message = "Name cannot exceed 100 characters"))]
    name: String,
}

// POST /v1/routines/drafts
pub async fn open_draft(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    drafts: web::Data<TemplateDraftStore>,
    payload: web::Json<OpenDraftRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = match payload.template_id {
        Some(template_id) => {
            let template = db::routines::find(&pool, owner.0, template_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Routine not found".to_string()))?;
            TemplateDraft::from_template(owner.0, template)
        }
        None => TemplateDraft::new(owner.0),
    };

    let response = HttpResponse::Created().json(&draft);
    drafts.insert(draft);
    Ok(response)
}

// GET /v1/routines/drafts/:draftId
pub async fn get_draft(
    owner: OwnerId,
    drafts: web::Data<TemplateDraftStore>,
    draft_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let draft = drafts.snapshot(*draft_id, owner.0)?;
    Ok(HttpResponse::Ok().json(draft))
}

// PATCH /v1/routines/drafts/:draftId
pub async fn rename_draft(
    owner: OwnerId,
    drafts: web::Data<TemplateDraftStore>,
    draft_id: web::Path<Uuid>,
    payload: web::Json<RenameDraftRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;

    let draft = drafts.with(*draft_id, owner.0, |draft| {
        draft.rename(&payload.name);
        Ok(draft.clone())
    })?;
    Ok(HttpResponse::Ok().json(draft))
}

// POST /v1/routines/drafts/:draftId/exercises
pub async fn add_draft_exercise(
    owner: OwnerId,
    drafts: web::Data<TemplateDraftStore>,
    draft_id: web::Path<Uuid>,
    payload: web::Json<ExerciseInput>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;

    let entry = drafts.with(*draft_id, owner.0, |draft| draft.add(&payload).cloned())?;
    Ok(HttpResponse::Created().json(entry))
}

// PUT /v1/routines/drafts/:draftId/exercises/:entryId
pub async fn edit_draft_exercise(
    owner: OwnerId,
    drafts: web::Data<TemplateDraftStore>,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<ExerciseInput>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let (draft_id, entry_id) = path.into_inner();

    let entry = drafts.with(draft_id, owner.0, |draft| draft.edit(entry_id, &payload).cloned())?;
    Ok(HttpResponse::Ok().json(entry))
}

// DELETE /v1/routines/drafts/:draftId/exercises/:entryId
pub async fn delete_draft_exercise(
    owner: OwnerId,
    drafts: web::Data<TemplateDraftStore>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (draft_id, entry_id) = path.into_inner();

    let draft = drafts.with(draft_id, owner.0, |draft| {
        draft.delete(entry_id)?;
        Ok(draft.clone())
    })?;
    Ok(HttpResponse::Ok().json(draft))
}

// POST /v1/routines/drafts/:draftId/save
pub async fn save_draft(
    owner: OwnerId,
    pool: web::Data<PgPool>,
    drafts: web::Data<TemplateDraftStore>,
    draft_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    // Taken out first so a double submit cannot create the template twice
    let draft = drafts.take(*draft_id, owner.0)?;
    let plan = match draft.save_plan() {
        Ok(plan) => plan,
        Err(err) => {
            drafts.restore(draft);
            return Err(err);
        }
    };

    let saved = match db::routines::save(&pool, owner.0, &plan).await {
        Ok(saved) => saved,
        Err(err) => {
            drafts.restore(draft);
            return Err(err.into());
        }
    };

    // Someone deleted the template while it was being edited
    let template_id = saved.ok_or_else(|| AppError::NotFound("Routine not found".to_string()))?;
    info!(
        "Saved routine {} with {} exercises for {}",
        template_id,
        plan.exercises.len(),
        owner.0
    );

    Ok(HttpResponse::Ok().json(json!({ "id": template_id })))
}

// DELETE /v1/routines/drafts/:draftId
pub async fn discard_draft(
    owner: OwnerId,
    drafts: web::Data<TemplateDraftStore>,
    draft_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    drafts.discard(*draft_id, owner.0)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Draft discarded" })))
}
