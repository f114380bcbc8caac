//! Field section entity model and DTOs.

use farmops_core::query::empty_as_none;
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

/// A row from the `field_sections` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldSection {
    #[ts(type = "number")]
    pub id: DbId,
    #[ts(type = "number")]
    pub field_id: DbId,
    pub name: String,
    pub area: f64,
    pub area_unit: String,
    pub crop_type: Option<String>,
    pub status: i32,
    pub remark: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

/// DTO for creating a section inside an existing field.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFieldSection {
    pub field_id: DbId,
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "area must not be negative"))]
    pub area: f64,
    pub area_unit: Option<String>,
    pub crop_type: Option<String>,
    pub status: Option<i32>,
    pub remark: Option<String>,
}

/// DTO for updating a section. The target id travels in the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldSection {
    pub id: DbId,
    pub field_id: Option<DbId>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, message = "area must not be negative"))]
    pub area: Option<f64>,
    pub area_unit: Option<String>,
    pub crop_type: Option<String>,
    pub status: Option<i32>,
    pub remark: Option<String>,
}

/// Query for `GET /field/section/list`. `fieldId` is mandatory; the handler
/// rejects requests without it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub field_id: Option<DbId>,
}
