//! Handlers for the `/log` resource (operation log). Admin only.

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use farmops_core::query::PageRequest;
use farmops_db::models::operation_log::{DeleteOperationLogs, OperationLog, OperationLogQuery};
use farmops_db::repositories::OperationLogRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::export::{export, ExportParams};
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{ApiResponse, PageData};
use crate::state::AppState;

/// Result of the bulk delete endpoints.
#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted: u64,
}

async fn page_of_logs(
    state: &AppState,
    params: &OperationLogQuery,
) -> AppResult<Json<ApiResponse<PageData<OperationLog>>>> {
    let page = PageRequest::new(params.page, params.page_size);
    let items = OperationLogRepo::list(&state.pool, params, page).await?;
    let total = OperationLogRepo::count(&state.pool, params).await?;
    Ok(Json(ApiResponse::ok(PageData::new(items, total, page))))
}

/// GET /api/log/list
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(params): QueryParams<OperationLogQuery>,
) -> AppResult<Json<ApiResponse<PageData<OperationLog>>>> {
    page_of_logs(&state, &params).await
}

/// POST /api/log/list
///
/// Same as the GET variant with filters in the body.
pub async fn search(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(params): ValidatedJson<OperationLogQuery>,
) -> AppResult<Json<ApiResponse<PageData<OperationLog>>>> {
    page_of_logs(&state, &params).await
}

/// POST /api/log/export?format=csv|json
///
/// Filters travel in the body; paging is ignored.
pub async fn export_logs(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    QueryParams(options): QueryParams<ExportParams>,
    ValidatedJson(params): ValidatedJson<OperationLogQuery>,
) -> AppResult<Response> {
    let rows = OperationLogRepo::list_all(&state.pool, &params).await?;
    tracing::info!(rows = rows.len(), user_id = admin.user_id, "Operation logs exported");
    export(options.format, "operation-logs", rows)
}

/// POST /api/log/delete
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(input): ValidatedJson<DeleteOperationLogs>,
) -> AppResult<Json<ApiResponse<DeletedCount>>> {
    let deleted = OperationLogRepo::delete_many(&state.pool, &input.ids).await?;
    tracing::info!(deleted, user_id = admin.user_id, "Operation logs deleted");
    Ok(Json(ApiResponse::with_message(
        DeletedCount { deleted },
        "Logs deleted",
    )))
}

/// POST /api/log/clear
pub async fn clear(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<ApiResponse<DeletedCount>>> {
    let deleted = OperationLogRepo::clear(&state.pool).await?;
    tracing::warn!(deleted, user_id = admin.user_id, "Operation log cleared");
    Ok(Json(ApiResponse::with_message(
        DeletedCount { deleted },
        "Logs cleared",
    )))
}
