pub mod activity;
pub mod alert;
pub mod auth;
pub mod equipment;
pub mod field;
pub mod health;
pub mod log;
pub mod menu;
pub mod role;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          login (public)
/// /auth/logout                         logout
///
/// /field/list                          list with sections
/// /field/detail/{id}                   detail with sections
/// /field/create                        create
/// /field/update                        update (id in body)
/// /field/delete/{id}, /field/delete    delete
/// /field/section/list?fieldId=         sections of one field
/// /field/section/create                create
/// /field/section/update                update (id in body)
/// /field/section/delete/{id}           delete
///
/// /activity/list                       list, filter, sort
/// /activity/statistics                 counts by type, status, month
/// /activity/export                     CSV / JSON download
/// /activity/create                     create
/// /activity/delete                     delete (id in body)
/// /activity/{id}                       get, update, delete
///
/// /equipment/list                      list, filter
/// /equipment/statistics                counts, battery, online rate
/// /equipment/export                    CSV / JSON download
/// /equipment/create                    create
/// /equipment/update                    update (id in body)
/// /equipment/delete                    delete (id in body)
/// /equipment/{id}                      get, delete
///
/// /alert/list                          list (filters in body)
/// /alert/statistics                    counts and rolling windows
/// /alert/create                        raise
/// /alert/process, /alert/ignore        close
/// /alert/assign                        assign to a user
///
/// /role/list, /role/create, /role/update, /role/delete/{id}     (admin)
///
/// /user/info, /user/permissions        own account
/// /user/list, /user/list/normal        (admin)
/// /user/detail/{id}, /user/create      (admin)
/// /user/{id}                           update (admin)
/// /user/{id}/reset-password            (admin)
/// /user/{id}/toggle-status             (admin)
///
/// /menu/all                            navigation tree
///
/// /log/list, /log/export, /log/delete, /log/clear               (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/field", field::router())
        .nest("/activity", activity::router())
        .nest("/equipment", equipment::router())
        .nest("/alert", alert::router())
        .nest("/role", role::router())
        .nest("/user", user::router())
        .nest("/menu", menu::router())
        .nest("/log", log::router())
}
