//! Handlers for the `/role` resource. Every route requires `super_admin`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use farmops_core::error::CoreError;
use farmops_core::query::PageRequest;
use farmops_core::roles::ROLE_SUPER_ADMIN;
use farmops_core::types::DbId;
use farmops_db::models::role::{CreateRole, Role, RoleQuery, UpdateRole};
use farmops_db::repositories::RoleRepo;
use sqlx::PgPool;

use super::not_found;
use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ApiResponse, PageData};
use crate::state::AppState;

async fn ensure_name_free(pool: &PgPool, name: &str, except_id: Option<DbId>) -> AppResult<()> {
    if RoleRepo::name_taken(pool, name, except_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Role '{name}' already exists"
        ))));
    }
    Ok(())
}

/// GET /api/role/list
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(params): QueryParams<RoleQuery>,
) -> AppResult<Json<ApiResponse<PageData<Role>>>> {
    let page = PageRequest::new(params.page, params.page_size);
    let items = RoleRepo::list(&state.pool, &params, page).await?;
    let total = RoleRepo::count(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(PageData::new(items, total, page))))
}

/// POST /api/role/create
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateRole>,
) -> AppResult<(StatusCode, Json<ApiResponse<Role>>)> {
    ensure_name_free(&state.pool, &input.name, None).await?;
    let role = RoleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        role_id = role.id,
        role = %role.name,
        user_id = admin.user_id,
        "Role created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(role, "Role created")),
    ))
}

/// POST /api/role/update
///
/// Replaces the role's name, description and grants. The `super_admin`
/// role keeps its name.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<UpdateRole>,
) -> AppResult<Json<ApiResponse<Role>>> {
    let current = RoleRepo::find_by_id(&state.pool, input.id)
        .await?
        .ok_or_else(|| not_found("Role", input.id))?;
    if current.name == ROLE_SUPER_ADMIN && input.name != ROLE_SUPER_ADMIN {
        return Err(AppError::BadRequest(format!(
            "The {ROLE_SUPER_ADMIN} role cannot be renamed"
        )));
    }
    ensure_name_free(&state.pool, &input.name, Some(input.id)).await?;
    let role = RoleRepo::update(&state.pool, &input)
        .await?
        .ok_or_else(|| not_found("Role", input.id))?;

    tracing::info!(role_id = role.id, user_id = admin.user_id, "Role updated");

    Ok(Json(ApiResponse::with_message(role, "Role updated")))
}

/// DELETE /api/role/delete/{id}
///
/// The `super_admin` role cannot be deleted.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let role = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Role", id))?;
    if role.name == ROLE_SUPER_ADMIN {
        return Err(AppError::BadRequest(format!(
            "The {ROLE_SUPER_ADMIN} role cannot be deleted"
        )));
    }
    if !RoleRepo::delete(&state.pool, id).await? {
        return Err(not_found("Role", id));
    }
    tracing::info!(role_id = id, user_id = admin.user_id, "Role deleted");
    Ok(Json(ApiResponse::with_message((), "Role deleted")))
}
