//! CSV / JSON export of activities, equipment and operation logs.
//!
//! CSV downloads are served as attachments with human-readable labels in
//! place of code values; the JSON variant returns the rows in the usual
//! success envelope.

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use farmops_core::activity::{activity_status, activity_type};
use farmops_core::equipment::{equipment_status, equipment_type};
use farmops_core::types::Timestamp;
use farmops_db::models::activity::Activity;
use farmops_db::models::equipment::Equipment;
use farmops_db::models::operation_log::OperationLog;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;

/// Output format selected with `?format=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// `?format=csv|json` query parameter, shared by every export route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: ExportFormat,
}

/// A row type that can be written as one CSV record.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

/// Build the export response for `rows`.
///
/// `name` is the file stem, e.g. `activities`; the download is named
/// `<name>-<YYYYMMDD>.csv`.
pub fn export<T>(format: ExportFormat, name: &str, rows: Vec<T>) -> AppResult<Response>
where
    T: CsvRecord + Serialize,
{
    match format {
        ExportFormat::Json => Ok(Json(ApiResponse::ok(rows)).into_response()),
        ExportFormat::Csv => {
            let body = to_csv(&rows)?;
            let filename = format!("{name}-{}.csv", chrono::Utc::now().format("%Y%m%d"));
            Ok((
                [
                    (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// Serialize rows to CSV text with a header line.
pub fn to_csv<T: CsvRecord>(rows: &[T]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(T::HEADERS).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row.record()).map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV flush error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::InternalError(format!("CSV encoding error: {e}")))
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::InternalError(format!("CSV write error: {err}"))
}

fn time(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl CsvRecord for Activity {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Title", "Type", "Status", "Field", "Section", "Executor", "Start time",
        "End time", "Materials", "Description", "Created",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            activity_type::label(self.activity_type).to_string(),
            activity_status::label(self.status).to_string(),
            text(&self.field_name),
            text(&self.section_name),
            text(&self.executor),
            time(Some(self.start_time)),
            time(self.end_time),
            self.materials.join(", "),
            text(&self.description),
            time(Some(self.created_at)),
        ]
    }
}

impl CsvRecord for Equipment {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Name", "Type", "Model", "Serial number", "Status", "Field", "Section",
        "Location", "Battery", "IP address", "Manufacturer", "Last report", "Created",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            equipment_type::label(self.equipment_type).to_string(),
            self.model.clone(),
            self.serial_number.clone(),
            equipment_status::label(self.status).to_string(),
            text(&self.field_name),
            text(&self.section_name),
            text(&self.location),
            self.battery_level.map(|b| format!("{b}%")).unwrap_or_default(),
            text(&self.ip_address),
            text(&self.manufacturer),
            time(self.last_report_time),
            time(Some(self.created_at)),
        ]
    }
}

impl CsvRecord for OperationLog {
    const HEADERS: &'static [&'static str] = &[
        "ID", "User", "Operation", "Module", "Description", "Method", "URL", "Status", "IP",
        "Browser", "OS", "Time",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.operation_type.clone(),
            self.module.clone(),
            self.description.clone(),
            self.request_method.clone(),
            self.request_url.clone(),
            self.status.clone(),
            self.ip.clone(),
            self.browser.clone(),
            self.os.clone(),
            time(Some(self.created_at)),
        ]
    }
}
