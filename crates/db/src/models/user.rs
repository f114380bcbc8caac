//! User entity model and DTOs.

use farmops_core::query::{code_filter, empty_as_none};
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub real_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub status: i32,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses, with role names resolved.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserResponse {
    #[ts(type = "number")]
    pub id: DbId,
    pub username: String,
    pub real_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub status: i32,
    pub roles: Vec<String>,
    pub last_login_at: Option<Timestamp>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

/// DTO for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub real_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
}

/// DTO for updating a user profile. A present `roles` list replaces the old one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "realName must not be empty"))]
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub status: Option<i32>,
    #[validate(length(min = 1, message = "roles must not be empty"))]
    pub roles: Option<Vec<String>>,
}

/// Filters for `GET /user/list` and `GET /user/list/normal`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub real_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub department: Option<String>,
    /// Exact role name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "code_filter")]
    pub status: Option<i32>,
}
