//! Route definitions for the `/user` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// GET  /info                  -> info
/// GET  /permissions           -> permissions
/// GET  /list                  -> list (admin)
/// GET  /list/normal           -> list_normal (admin)
/// GET  /detail/{id}           -> get_by_id (admin)
/// POST /create                -> create (admin)
/// PUT  /{id}                  -> update (admin)
/// PUT  /{id}/reset-password   -> reset_password (admin)
/// PUT  /{id}/toggle-status    -> toggle_status (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/info", get(user::info))
        .route("/permissions", get(user::permissions))
        .route("/list", get(user::list))
        .route("/list/normal", get(user::list_normal))
        .route("/detail/{id}", get(user::get_by_id))
        .route("/create", post(user::create))
        .route("/{id}", put(user::update))
        .route("/{id}/reset-password", put(user::reset_password))
        .route("/{id}/toggle-status", put(user::toggle_status))
}
