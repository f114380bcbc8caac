//! Field (farm plot) entity model and DTOs.

use farmops_core::query::{code_filter, empty_as_none};
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

use crate::models::section::FieldSection;

/// Area unit applied when the client does not send one.
pub const DEFAULT_AREA_UNIT: &str = "亩";

/// A row from the `fields` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Field {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub manager: String,
    pub area: f64,
    pub area_unit: String,
    pub status: i32,
    pub remark: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

/// A field together with its sections, as returned by list and detail.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct FieldWithSections {
    #[serde(flatten)]
    pub field: Field,
    pub sections: Vec<FieldSection>,
}

/// DTO for creating a new field.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateField {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "manager is required"))]
    pub manager: String,
    #[validate(range(min = 0.0, message = "area must not be negative"))]
    pub area: f64,
    pub area_unit: Option<String>,
    pub status: Option<i32>,
    pub remark: Option<String>,
}

/// DTO for updating a field. The target id travels in the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateField {
    pub id: DbId,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "address must not be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "manager must not be empty"))]
    pub manager: Option<String>,
    #[validate(range(min = 0.0, message = "area must not be negative"))]
    pub area: Option<f64>,
    pub area_unit: Option<String>,
    pub status: Option<i32>,
    pub remark: Option<String>,
}

/// Filters for `GET /field/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub manager: Option<String>,
    #[serde(default, deserialize_with = "code_filter")]
    pub status: Option<i32>,
}
