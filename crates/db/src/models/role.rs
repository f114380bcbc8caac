//! Role entity model and DTOs.

use farmops_core::query::empty_as_none;
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

/// A role with the names of the permissions it grants.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Role {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

/// DTO for creating a role. Unknown permission names are created on first use.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRole {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "permissions must not be empty"))]
    pub permissions: Vec<String>,
}

/// DTO for updating a role. Name, description and grants are all replaced.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRole {
    pub id: DbId,
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "permissions must not be empty"))]
    pub permissions: Vec<String>,
}

/// Filters for `GET /role/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
}
