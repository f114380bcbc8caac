//! Handler for the navigation menu.

use axum::extract::State;
use axum::Json;
use farmops_core::menu::{visible_menu, MenuItem};
use farmops_db::repositories::RoleRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/menu/all
///
/// The static menu tree, filtered by the caller's current permissions.
pub async fn all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<&'static MenuItem>>>> {
    let granted = RoleRepo::permissions_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(visible_menu(&granted))))
}
