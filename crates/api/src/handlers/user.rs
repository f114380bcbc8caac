//! Handlers for the `/user` resource.
//!
//! Account management requires `super_admin`; `info` and `permissions`
//! serve the caller's own account.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use farmops_core::error::{ensure_known_code, CoreError};
use farmops_core::query::PageRequest;
use farmops_core::roles::user_status;
use farmops_core::types::DbId;
use farmops_db::models::user::{CreateUser, UpdateUser, UserQuery, UserResponse};
use farmops_db::repositories::{RoleRepo, UserRepo};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use super::not_found;
use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ApiResponse, PageData};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /user/create`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "realName is required"))]
    pub real_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    pub department: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "roles must not be empty"))]
    pub roles: Vec<String>,
}

/// Optional body for `PUT /user/{id}/reset-password`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_roles_exist(pool: &PgPool, roles: &[String]) -> AppResult<()> {
    let missing = RoleRepo::missing_names(pool, roles).await?;
    if !missing.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown roles: {}",
            missing.join(", ")
        ))));
    }
    Ok(())
}

fn hash(password: &str) -> AppResult<String> {
    validate_password_strength(password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

fn own_account_error() -> AppError {
    AppError::BadRequest("You cannot disable your own account".into())
}

async fn list_users(
    pool: &PgPool,
    params: &UserQuery,
    exclude_super_admins: bool,
) -> AppResult<PageData<UserResponse>> {
    let page = PageRequest::new(params.page, params.page_size);
    let items = UserRepo::list(pool, params, exclude_super_admins, page).await?;
    let total = UserRepo::count(pool, params, exclude_super_admins).await?;
    Ok(PageData::new(items, total, page))
}

// ---------------------------------------------------------------------------
// Own account
// ---------------------------------------------------------------------------

/// GET /api/user/info
pub async fn info(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_response(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| not_found("User", auth.user_id))?;
    Ok(Json(ApiResponse::ok(user)))
}

/// GET /api/user/permissions
pub async fn permissions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let names = RoleRepo::permissions_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(names)))
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

/// GET /api/user/list
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(params): QueryParams<UserQuery>,
) -> AppResult<Json<ApiResponse<PageData<UserResponse>>>> {
    Ok(Json(ApiResponse::ok(list_users(&state.pool, &params, false).await?)))
}

/// GET /api/user/list/normal
///
/// Same as `list` without super-admin accounts.
pub async fn list_normal(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(params): QueryParams<UserQuery>,
) -> AppResult<Json<ApiResponse<PageData<UserResponse>>>> {
    Ok(Json(ApiResponse::ok(list_users(&state.pool, &params, true).await?)))
}

/// GET /api/user/detail/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/user/create
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let password_hash = hash(&input.password)?;
    if UserRepo::username_taken(&state.pool, &input.username).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Username '{}' is already taken",
            input.username
        ))));
    }
    ensure_roles_exist(&state.pool, &input.roles).await?;

    let dto = CreateUser {
        username: input.username,
        password_hash,
        real_name: input.real_name,
        phone: Some(input.phone),
        department: input.department,
    };
    let user = UserRepo::create(&state.pool, &dto, &input.roles).await?;

    tracing::info!(
        new_user_id = user.id,
        username = %user.username,
        user_id = admin.user_id,
        "User created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User created")),
    ))
}

/// PUT /api/user/{id}
///
/// A present `roles` list replaces the account's roles.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if let Some(status) = input.status {
        ensure_known_code("user status", status, user_status::ALL)?;
        if id == admin.user_id && status != user_status::ENABLED {
            return Err(own_account_error());
        }
    }
    if let Some(ref roles) = input.roles {
        ensure_roles_exist(&state.pool, roles).await?;
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("User", id))?;

    tracing::info!(target_user_id = id, user_id = admin.user_id, "User updated");

    Ok(Json(ApiResponse::with_message(user, "User updated")))
}

/// PUT /api/user/{id}/reset-password
///
/// Sets `newPassword`, or the configured default when the body omits it.
/// Also clears any login lockout.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let request: ResetPasswordRequest = if body.is_empty() {
        ResetPasswordRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };
    let password = request
        .new_password
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| state.config.default_reset_password.clone());

    let password_hash = hash(&password)?;
    if !UserRepo::update_password(&state.pool, id, &password_hash).await? {
        return Err(not_found("User", id));
    }

    tracing::info!(target_user_id = id, user_id = admin.user_id, "Password reset");

    Ok(Json(ApiResponse::with_message((), "Password reset")))
}

/// PUT /api/user/{id}/toggle-status
///
/// Administrators cannot disable their own account.
pub async fn toggle_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(own_account_error());
    }
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    let status = user_status::toggled(user.status);
    UserRepo::set_status(&state.pool, id, status).await?;

    tracing::info!(target_user_id = id, status, user_id = admin.user_id, "User status toggled");

    let user = UserRepo::find_response(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("User", id))?;
    Ok(Json(ApiResponse::with_message(user, "Status updated")))
}
