//! Alert entity model and DTOs.

use std::collections::BTreeMap;

use farmops_core::query::{code_filter, empty_as_none, end_bound, start_bound};
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

/// An alert row joined with the names of everything it references.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Alert {
    #[ts(type = "number")]
    pub id: DbId,
    pub title: String,
    pub content: String,
    pub level: i32,
    pub status: i32,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub source: Option<String>,
    #[ts(type = "number | null")]
    pub field_id: Option<DbId>,
    pub field_name: Option<String>,
    #[ts(type = "number | null")]
    pub section_id: Option<DbId>,
    pub section_name: Option<String>,
    #[ts(type = "number | null")]
    pub equipment_id: Option<DbId>,
    pub equipment_name: Option<String>,
    #[ts(type = "number | null")]
    pub assignee_id: Option<DbId>,
    pub assignee_name: Option<String>,
    pub handle_time: Option<Timestamp>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

/// DTO for raising an alert. New alerts always start pending.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlert {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub level: i32,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub source: Option<String>,
    pub field_id: Option<DbId>,
    pub section_id: Option<DbId>,
    pub equipment_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
}

/// Body of `POST /alert/assign`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignAlert {
    pub id: DbId,
    pub assignee_id: DbId,
}

/// Body of `POST /alert/list`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    /// Matches title, content or equipment name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub keyword: Option<String>,
    #[serde(default, deserialize_with = "code_filter")]
    pub status: Option<i32>,
    #[serde(default, deserialize_with = "code_filter")]
    pub level: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub assignee_id: Option<DbId>,
    #[serde(default, deserialize_with = "start_bound")]
    pub start_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "end_bound")]
    pub end_time: Option<Timestamp>,
}

/// Query for `GET /alert/statistics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatisticsQuery {
    #[serde(default, deserialize_with = "start_bound")]
    pub start_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "end_bound")]
    pub end_time: Option<Timestamp>,
}

/// Response body of `GET /alert/statistics`.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AlertStatistics {
    #[ts(type = "number")]
    pub total_count: i64,
    #[ts(type = "Record<string, number>")]
    pub status_counts: BTreeMap<String, i64>,
    #[ts(type = "Record<string, number>")]
    pub level_counts: BTreeMap<String, i64>,
    #[ts(type = "number")]
    pub today_count: i64,
    #[ts(type = "number")]
    pub week_count: i64,
    #[ts(type = "number")]
    pub month_count: i64,
}
