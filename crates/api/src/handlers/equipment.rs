//! Handlers for the `/equipment` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use farmops_core::equipment::{equipment_status, equipment_type};
use farmops_core::error::{ensure_known_code, CoreError};
use farmops_core::query::PageRequest;
use farmops_core::statistics::{rate, zero_filled};
use farmops_core::types::DbId;
use farmops_db::models::equipment::{
    CreateEquipment, Equipment, EquipmentQuery, EquipmentStatistics, EquipmentStatisticsQuery,
    UpdateEquipment,
};
use farmops_db::repositories::EquipmentRepo;
use sqlx::PgPool;

use super::{ensure_placement, not_found, IdRequest};
use crate::error::{AppError, AppResult};
use crate::export::{export, ExportParams};
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, PageData};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_codes(kind: Option<i32>, status: Option<i32>) -> Result<(), CoreError> {
    if let Some(code) = kind {
        ensure_known_code("equipment type", code, equipment_type::ALL)?;
    }
    if let Some(code) = status {
        ensure_known_code("equipment status", code, equipment_status::ALL)?;
    }
    Ok(())
}

async fn ensure_serial_free(
    pool: &PgPool,
    serial_number: &str,
    except_id: Option<DbId>,
) -> AppResult<()> {
    if EquipmentRepo::serial_number_taken(pool, serial_number, except_id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Serial number '{serial_number}' is already registered"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/equipment/list
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<EquipmentQuery>,
) -> AppResult<Json<ApiResponse<PageData<Equipment>>>> {
    let page = PageRequest::new(params.page, params.page_size);
    let items = EquipmentRepo::list(&state.pool, &params, page).await?;
    let total = EquipmentRepo::count(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(PageData::new(items, total, page))))
}

/// GET /api/equipment/statistics?fieldId=
pub async fn statistics(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<EquipmentStatisticsQuery>,
) -> AppResult<Json<ApiResponse<EquipmentStatistics>>> {
    let field_id = params.field_id;
    let by_status = EquipmentRepo::count_by_status(&state.pool, field_id).await?;
    let by_type = EquipmentRepo::count_by_type(&state.pool, field_id).await?;
    let battery_stats = EquipmentRepo::battery_stats(&state.pool, field_id).await?;
    let online = EquipmentRepo::count_online(&state.pool, field_id).await?;
    let total_count: i64 = by_status.iter().map(|(_, count)| count).sum();

    Ok(Json(ApiResponse::ok(EquipmentStatistics {
        total_count,
        by_status: zero_filled(equipment_status::ALL, &by_status),
        by_type: zero_filled(equipment_type::ALL, &by_type),
        battery_stats,
        online_rate: rate(online, total_count),
    })))
}

/// GET /api/equipment/export?format=csv|json
pub async fn export_equipment(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<EquipmentQuery>,
    QueryParams(options): QueryParams<ExportParams>,
) -> AppResult<Response> {
    let rows = EquipmentRepo::list_all(&state.pool, &params).await?;
    tracing::info!(rows = rows.len(), format = ?options.format, "Equipment exported");
    export(options.format, "equipment", rows)
}

/// GET /api/equipment/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    let equipment = EquipmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Equipment", id))?;
    Ok(Json(ApiResponse::ok(equipment)))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/equipment/create
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<ApiResponse<Equipment>>)> {
    validate_codes(Some(input.equipment_type), Some(input.status))?;
    ensure_placement(&state.pool, input.field_id, input.section_id).await?;
    ensure_serial_free(&state.pool, &input.serial_number, None).await?;

    let equipment = EquipmentRepo::create(&state.pool, &input).await?;

    tracing::info!(
        equipment_id = equipment.id,
        serial_number = %equipment.serial_number,
        user_id = auth.user_id,
        "Equipment registered",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(equipment, "Equipment created")),
    ))
}

/// PUT /api/equipment/update
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<UpdateEquipment>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    let current = EquipmentRepo::find_by_id(&state.pool, input.id)
        .await?
        .ok_or_else(|| not_found("Equipment", input.id))?;

    validate_codes(input.equipment_type, input.status)?;
    if input.field_id.is_some() || input.section_id.is_some() {
        ensure_placement(
            &state.pool,
            input.field_id.unwrap_or(current.field_id),
            input.section_id.or(current.section_id),
        )
        .await?;
    }
    if let Some(ref serial_number) = input.serial_number {
        ensure_serial_free(&state.pool, serial_number, Some(input.id)).await?;
    }

    let equipment = EquipmentRepo::update(&state.pool, &input)
        .await?
        .ok_or_else(|| not_found("Equipment", input.id))?;

    tracing::info!(equipment_id = equipment.id, user_id = auth.user_id, "Equipment updated");

    Ok(Json(ApiResponse::with_message(equipment, "Equipment updated")))
}

/// DELETE /api/equipment/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    delete_equipment(&state, &auth, id).await
}

/// DELETE /api/equipment/delete
pub async fn delete_by_body(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<IdRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    delete_equipment(&state, &auth, input.id).await
}

async fn delete_equipment(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Json<ApiResponse<()>>> {
    if !EquipmentRepo::delete(&state.pool, id).await? {
        return Err(not_found("Equipment", id));
    }
    tracing::info!(equipment_id = id, user_id = auth.user_id, "Equipment deleted");
    Ok(Json(ApiResponse::with_message((), "Equipment deleted")))
}
