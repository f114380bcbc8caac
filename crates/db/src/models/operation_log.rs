//! Operation log entity model and DTOs.
//!
//! Log rows are immutable records of API calls (no `updated_at`).

use farmops_core::query::{empty_as_none, end_bound, start_bound};
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A single operation log entry.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OperationLog {
    #[ts(type = "number")]
    pub id: DbId,
    #[ts(type = "number | null")]
    pub user_id: Option<DbId>,
    pub username: String,
    pub operation_type: String,
    pub module: String,
    pub description: String,
    pub request_url: String,
    pub request_method: String,
    pub request_params: Option<String>,
    pub response_data: Option<String>,
    pub status: String,
    pub ip: String,
    pub browser: String,
    pub os: String,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a log entry, produced by the logging middleware.
#[derive(Debug, Clone)]
pub struct CreateOperationLog {
    pub user_id: Option<DbId>,
    pub username: String,
    pub operation_type: String,
    pub module: String,
    pub description: String,
    pub request_url: String,
    pub request_method: String,
    pub request_params: Option<String>,
    pub response_data: Option<String>,
    pub status: String,
    pub ip: String,
    pub browser: String,
    pub os: String,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filters for listing and exporting logs. Accepted both as a query string
/// and as a JSON body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OperationLogQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub operation_type: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "start_bound")]
    pub start_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "end_bound")]
    pub end_time: Option<Timestamp>,
}

/// Body of `POST /log/delete`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOperationLogs {
    #[serde(default)]
    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<DbId>,
}
