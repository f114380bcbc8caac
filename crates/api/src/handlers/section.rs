//! Handlers for the `/field/section` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use farmops_core::types::DbId;
use farmops_db::models::section::{
    CreateFieldSection, FieldSection, SectionQuery, UpdateFieldSection,
};
use farmops_db::repositories::SectionRepo;

use super::{ensure_field_exists, not_found};
use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/field/section/list?fieldId=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<SectionQuery>,
) -> AppResult<Json<ApiResponse<Vec<FieldSection>>>> {
    let field_id = params
        .field_id
        .ok_or_else(|| AppError::BadRequest("fieldId is required".into()))?;
    let sections = SectionRepo::list_by_field(&state.pool, field_id).await?;
    Ok(Json(ApiResponse::ok(sections)))
}

/// POST /api/field/section/create
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateFieldSection>,
) -> AppResult<(StatusCode, Json<ApiResponse<FieldSection>>)> {
    ensure_field_exists(&state.pool, input.field_id).await?;
    let section = SectionRepo::create(&state.pool, &input).await?;

    tracing::info!(
        section_id = section.id,
        field_id = section.field_id,
        user_id = auth.user_id,
        "Field section created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(section, "Section created")),
    ))
}

/// PUT /api/field/section/update
///
/// Moving a section to another field carries its activities, equipment and
/// alerts along.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateFieldSection>,
) -> AppResult<Json<ApiResponse<FieldSection>>> {
    SectionRepo::find_by_id(&state.pool, input.id)
        .await?
        .ok_or_else(|| not_found("FieldSection", input.id))?;
    if let Some(field_id) = input.field_id {
        ensure_field_exists(&state.pool, field_id).await?;
    }

    let section = SectionRepo::update(&state.pool, &input)
        .await?
        .ok_or_else(|| not_found("FieldSection", input.id))?;

    tracing::info!(section_id = section.id, user_id = auth.user_id, "Field section updated");

    Ok(Json(ApiResponse::with_message(section, "Section updated")))
}

/// DELETE /api/field/section/delete/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !SectionRepo::delete(&state.pool, id).await? {
        return Err(not_found("FieldSection", id));
    }
    tracing::info!(section_id = id, user_id = auth.user_id, "Field section deleted");
    Ok(Json(ApiResponse::with_message((), "Section deleted")))
}
