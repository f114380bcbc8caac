//! Equipment entity model and DTOs.

use std::collections::BTreeMap;

use farmops_core::query::{code_filter, empty_as_none, optional_timestamp};
use farmops_core::statistics::BatteryStats;
use farmops_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An equipment row joined with the names of its field and section.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Equipment {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: i32,
    pub model: String,
    pub serial_number: String,
    pub status: i32,
    #[ts(type = "number")]
    pub field_id: DbId,
    pub field_name: Option<String>,
    #[ts(type = "number | null")]
    pub section_id: Option<DbId>,
    pub section_name: Option<String>,
    pub location: Option<String>,
    pub battery_level: Option<i32>,
    pub ip_address: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    pub install_time: Option<Timestamp>,
    pub last_report_time: Option<Timestamp>,
    pub last_maintenance_time: Option<Timestamp>,
    pub next_maintenance_time: Option<Timestamp>,
    pub purchase_date: Option<Timestamp>,
    #[serde(rename = "createTime")]
    pub created_at: Timestamp,
    #[serde(rename = "updateTime")]
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for registering a device.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: i32,
    #[serde(default)]
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "serialNumber is required"))]
    pub serial_number: String,
    pub field_id: DbId,
    pub section_id: Option<DbId>,
    pub status: i32,
    pub location: Option<String>,
    #[validate(range(min = 0, max = 100, message = "batteryLevel must be between 0 and 100"))]
    pub battery_level: Option<i32>,
    pub ip_address: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub install_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_report_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_maintenance_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub next_maintenance_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub purchase_date: Option<Timestamp>,
}

/// DTO for updating a device. The target id travels in the body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    pub id: DbId,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub equipment_type: Option<i32>,
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: Option<String>,
    #[validate(length(min = 1, message = "serialNumber must not be empty"))]
    pub serial_number: Option<String>,
    pub field_id: Option<DbId>,
    pub section_id: Option<DbId>,
    pub status: Option<i32>,
    pub location: Option<String>,
    #[validate(range(min = 0, max = 100, message = "batteryLevel must be between 0 and 100"))]
    pub battery_level: Option<i32>,
    pub ip_address: Option<String>,
    pub manufacturer: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub install_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_report_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_maintenance_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub next_maintenance_time: Option<Timestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub purchase_date: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filters for listing and exporting equipment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    /// Matches name, model or serial number.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub keyword: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "code_filter")]
    pub equipment_type: Option<i32>,
    #[serde(default, deserialize_with = "code_filter")]
    pub status: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub field_id: Option<DbId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub section_id: Option<DbId>,
}

/// Query for `GET /equipment/statistics`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStatisticsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub field_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Response body of `GET /equipment/statistics`.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EquipmentStatistics {
    #[ts(type = "number")]
    pub total_count: i64,
    #[ts(type = "Record<string, number>")]
    pub by_status: BTreeMap<String, i64>,
    #[ts(type = "Record<string, number>")]
    pub by_type: BTreeMap<String, i64>,
    #[ts(type = "{ low: number, medium: number, high: number, noData: number }")]
    pub battery_stats: BatteryStats,
    pub online_rate: f64,
}
