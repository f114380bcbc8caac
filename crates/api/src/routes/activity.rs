//! Route definitions for the `/activity` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::activity;
use crate::state::AppState;

/// Routes mounted at `/activity`.
///
/// ```text
/// GET    /list        -> list
/// GET    /statistics  -> statistics
/// GET    /export      -> export_activities
/// POST   /create      -> create
/// DELETE /delete      -> delete_by_body
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(activity::list))
        .route("/statistics", get(activity::statistics))
        .route("/export", get(activity::export_activities))
        .route("/create", post(activity::create))
        .route("/delete", delete(activity::delete_by_body))
        .route(
            "/{id}",
            get(activity::get_by_id)
                .put(activity::update)
                .delete(activity::delete),
        )
}
