//! Route definitions for the `/equipment` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::equipment;
use crate::state::AppState;

/// Routes mounted at `/equipment`.
///
/// ```text
/// GET    /list        -> list
/// GET    /statistics  -> statistics
/// GET    /export      -> export_equipment
/// POST   /create      -> create
/// PUT    /update      -> update
/// DELETE /delete      -> delete_by_body
/// GET    /{id}        -> get_by_id
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(equipment::list))
        .route("/statistics", get(equipment::statistics))
        .route("/export", get(equipment::export_equipment))
        .route("/create", post(equipment::create))
        .route("/update", put(equipment::update))
        .route("/delete", delete(equipment::delete_by_body))
        .route("/{id}", get(equipment::get_by_id).delete(equipment::delete))
}
