//! Handlers for the `/field` resource.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use farmops_core::query::PageRequest;
use farmops_core::types::DbId;
use farmops_db::models::field::{CreateField, FieldQuery, FieldWithSections, UpdateField};
use farmops_db::models::section::FieldSection;
use farmops_db::repositories::{FieldRepo, SectionRepo};

use super::{not_found, IdRequest};
use crate::error::AppResult;
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, PageData};
use crate::state::AppState;

/// GET /api/field/list
///
/// Newest first; every item embeds its sections.
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<FieldQuery>,
) -> AppResult<Json<ApiResponse<PageData<FieldWithSections>>>> {
    let page = PageRequest::new(params.page, params.page_size);
    let fields = FieldRepo::list(&state.pool, &params, page).await?;
    let total = FieldRepo::count(&state.pool, &params).await?;

    let ids: Vec<DbId> = fields.iter().map(|f| f.id).collect();
    let mut by_field: HashMap<DbId, Vec<FieldSection>> = HashMap::new();
    for section in SectionRepo::list_by_fields(&state.pool, &ids).await? {
        by_field.entry(section.field_id).or_default().push(section);
    }

    let items = fields
        .into_iter()
        .map(|field| {
            let sections = by_field.remove(&field.id).unwrap_or_default();
            FieldWithSections { field, sections }
        })
        .collect();

    Ok(Json(ApiResponse::ok(PageData::new(items, total, page))))
}

/// GET /api/field/detail/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<FieldWithSections>>> {
    let field = FieldRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Field", id))?;
    let sections = SectionRepo::list_by_field(&state.pool, id).await?;
    Ok(Json(ApiResponse::ok(FieldWithSections { field, sections })))
}

/// POST /api/field/create
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateField>,
) -> AppResult<(StatusCode, Json<ApiResponse<FieldWithSections>>)> {
    let field = FieldRepo::create(&state.pool, &input).await?;

    tracing::info!(field_id = field.id, user_id = auth.user_id, "Field created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            FieldWithSections {
                field,
                sections: Vec::new(),
            },
            "Field created",
        )),
    ))
}

/// PUT /api/field/update
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateField>,
) -> AppResult<Json<ApiResponse<FieldWithSections>>> {
    let field = FieldRepo::update(&state.pool, &input)
        .await?
        .ok_or_else(|| not_found("Field", input.id))?;
    let sections = SectionRepo::list_by_field(&state.pool, field.id).await?;

    tracing::info!(field_id = field.id, user_id = auth.user_id, "Field updated");

    Ok(Json(ApiResponse::with_message(
        FieldWithSections { field, sections },
        "Field updated",
    )))
}

/// DELETE /api/field/delete/{id}
///
/// Sections, activities and equipment of the field go with it.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    delete_field(&state, &auth, id).await
}

/// DELETE /api/field/delete
pub async fn delete_by_body(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<IdRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    delete_field(&state, &auth, input.id).await
}

async fn delete_field(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Json<ApiResponse<()>>> {
    if !FieldRepo::delete(&state.pool, id).await? {
        return Err(not_found("Field", id));
    }
    tracing::info!(field_id = id, user_id = auth.user_id, "Field deleted");
    Ok(Json(ApiResponse::with_message((), "Field deleted")))
}
