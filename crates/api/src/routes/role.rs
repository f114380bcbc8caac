//! Route definitions for the `/role` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

/// Routes mounted at `/role` (admin only).
///
/// ```text
/// GET    /list         -> list
/// POST   /create       -> create
/// POST   /update       -> update
/// DELETE /delete/{id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(role::list))
        .route("/create", post(role::create))
        .route("/update", post(role::update))
        .route("/delete/{id}", delete(role::delete))
}
