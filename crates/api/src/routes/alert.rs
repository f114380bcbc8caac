//! Route definitions for the `/alert` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alert;
use crate::state::AppState;

/// Routes mounted at `/alert`.
///
/// ```text
/// POST /list        -> list
/// GET  /statistics  -> statistics
/// POST /create      -> create
/// POST /process     -> process
/// POST /ignore      -> ignore
/// POST /assign      -> assign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(alert::list))
        .route("/statistics", get(alert::statistics))
        .route("/create", post(alert::create))
        .route("/process", post(alert::process))
        .route("/ignore", post(alert::ignore))
        .route("/assign", post(alert::assign))
}
