//! Route definitions for the `/menu` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::menu;
use crate::state::AppState;

/// Routes mounted at `/menu`.
///
/// ```text
/// GET /all  -> all
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/all", get(menu::all))
}
