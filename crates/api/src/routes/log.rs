//! Route definitions for the `/log` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::log;
use crate::state::AppState;

/// Routes mounted at `/log` (admin only).
///
/// ```text
/// GET  /list    -> list (filters in query)
/// POST /list    -> search (filters in body)
/// POST /export  -> export_logs
/// POST /delete  -> delete
/// POST /clear   -> clear
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(log::list).post(log::search))
        .route("/export", post(log::export_logs))
        .route("/delete", post(log::delete))
        .route("/clear", post(log::clear))
}
