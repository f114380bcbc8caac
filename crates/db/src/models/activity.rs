//! Farming activity entity model and DTOs.

use std::collections::BTreeMap;

use farmops_core::query::{
    code_filter, empty_as_none, end_bound, flexible_timestamp, optional_timestamp, start_bound,
};
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An activity row joined with the names of its field and section.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Activity {
    #[ts(type = "number")]
    pub id: DbId,
    #[ts(type = "number")]
    pub field_id: DbId,
    pub field_name: Option<String>,
    #[ts(type = "number | null")]
    pub section_id: Option<DbId>,
    pub section_name: Option<String>,
    pub title: String,
    pub activity_type: i32,
    pub description: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub status: i32,
    pub executor: Option<String>,
    pub materials: Vec<String>,
    pub data_source: i32,
    pub weather_info: Option<String>,
    pub effect_description: Option<String>,
    pub images: Vec<String>,
    pub remark: Option<String>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating an activity.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivity {
    pub field_id: DbId,
    pub section_id: Option<DbId>,
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub activity_type: i32,
    pub description: Option<String>,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub start_time: Timestamp,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub end_time: Option<Timestamp>,
    pub status: i32,
    pub executor: Option<String>,
    pub materials: Option<Vec<String>>,
    pub data_source: Option<i32>,
    pub weather_info: Option<String>,
    pub effect_description: Option<String>,
    pub images: Option<Vec<String>>,
    pub remark: Option<String>,
}

/// DTO for updating an activity. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivity {
    pub field_id: Option<DbId>,
    pub section_id: Option<DbId>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub activity_type: Option<i32>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub start_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub end_time: Option<Timestamp>,
    pub status: Option<i32>,
    pub executor: Option<String>,
    pub materials: Option<Vec<String>>,
    pub data_source: Option<i32>,
    pub weather_info: Option<String>,
    pub effect_description: Option<String>,
    pub images: Option<Vec<String>>,
    pub remark: Option<String>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filters for listing, exporting and aggregating activities.
///
/// Paging and sorting fields are ignored by export and statistics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub field_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub section_id: Option<DbId>,
    #[serde(default, deserialize_with = "code_filter")]
    pub activity_type: Option<i32>,
    #[serde(default, deserialize_with = "code_filter")]
    pub status: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub executor: Option<String>,
    #[serde(default, deserialize_with = "start_bound")]
    pub start_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "end_bound")]
    pub end_date: Option<Timestamp>,
    /// JSON name of the sort column, e.g. `startTime`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Response body of `GET /activity/statistics`.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActivityStatistics {
    #[ts(type = "Record<string, number>")]
    pub by_type: BTreeMap<String, i64>,
    #[ts(type = "Record<string, number>")]
    pub by_status: BTreeMap<String, i64>,
    #[ts(type = "Record<string, number>")]
    pub by_month: BTreeMap<String, i64>,
    #[ts(type = "number")]
    pub total_count: i64,
}
