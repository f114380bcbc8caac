//! Route definitions for the `/field` resource and its sections.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{field, section};
use crate::state::AppState;

/// Routes mounted at `/field`.
///
/// ```text
/// GET    /list                 -> list
/// GET    /detail/{id}          -> get_by_id
/// POST   /create               -> create
/// PUT    /update               -> update
/// DELETE /delete/{id}          -> delete
/// DELETE /delete               -> delete_by_body
///
/// GET    /section/list         -> section::list
/// POST   /section/create       -> section::create
/// PUT    /section/update       -> section::update
/// DELETE /section/delete/{id}  -> section::delete
/// ```
pub fn router() -> Router<AppState> {
    let section_routes = Router::new()
        .route("/list", get(section::list))
        .route("/create", post(section::create))
        .route("/update", put(section::update))
        .route("/delete/{id}", delete(section::delete));

    Router::new()
        .route("/list", get(field::list))
        .route("/detail/{id}", get(field::get_by_id))
        .route("/create", post(field::create))
        .route("/update", put(field::update))
        .route("/delete", delete(field::delete_by_body))
        .route("/delete/{id}", delete(field::delete))
        .nest("/section", section_routes)
}
