//! Handlers for the `/alert` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use farmops_core::alert::{alert_level, alert_status};
use farmops_core::error::ensure_known_code;
use farmops_core::query::PageRequest;
use farmops_core::statistics::zero_filled;
use farmops_core::types::DbId;
use farmops_db::models::alert::{
    Alert, AlertQuery, AlertStatistics, AlertStatisticsQuery, AssignAlert, CreateAlert,
};
use farmops_db::repositories::{AlertRepo, EquipmentRepo, SectionRepo, UserRepo};
use sqlx::PgPool;

use super::{ensure_placement, not_found, IdRequest};
use crate::error::AppResult;
use crate::extract::{QueryParams, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::{ApiResponse, PageData};
use crate::state::AppState;

async fn ensure_user_exists(pool: &PgPool, id: DbId) -> AppResult<()> {
    if UserRepo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(not_found("User", id))
    }
}

/// POST /api/alert/list
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidatedJson(params): ValidatedJson<AlertQuery>,
) -> AppResult<Json<ApiResponse<PageData<Alert>>>> {
    let page = PageRequest::new(params.page, params.page_size);
    let items = AlertRepo::list(&state.pool, &params, page).await?;
    let total = AlertRepo::count(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(PageData::new(items, total, page))))
}

/// GET /api/alert/statistics
///
/// Totals honor `startTime` / `endTime`; the today, week and month counts
/// are always relative to now.
pub async fn statistics(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<AlertStatisticsQuery>,
) -> AppResult<Json<ApiResponse<AlertStatistics>>> {
    let (from, to) = (params.start_time, params.end_time);
    let by_status = AlertRepo::count_by_status(&state.pool, from, to).await?;
    let by_level = AlertRepo::count_by_level(&state.pool, from, to).await?;
    let windows = AlertRepo::window_counts(&state.pool).await?;

    Ok(Json(ApiResponse::ok(AlertStatistics {
        total_count: by_status.iter().map(|(_, count)| count).sum(),
        status_counts: zero_filled(alert_status::ALL, &by_status),
        level_counts: zero_filled(alert_level::ALL, &by_level),
        today_count: windows.today,
        week_count: windows.week,
        month_count: windows.month,
    })))
}

/// POST /api/alert/create
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateAlert>,
) -> AppResult<(StatusCode, Json<ApiResponse<Alert>>)> {
    ensure_known_code("alert level", input.level, alert_level::ALL)?;

    match (input.field_id, input.section_id) {
        (Some(field_id), section_id) => {
            ensure_placement(&state.pool, field_id, section_id).await?;
        }
        (None, Some(section_id)) => {
            SectionRepo::find_by_id(&state.pool, section_id)
                .await?
                .ok_or_else(|| not_found("FieldSection", section_id))?;
        }
        (None, None) => {}
    }
    if let Some(equipment_id) = input.equipment_id {
        if !EquipmentRepo::exists(&state.pool, equipment_id).await? {
            return Err(not_found("Equipment", equipment_id));
        }
    }
    if let Some(assignee_id) = input.assignee_id {
        ensure_user_exists(&state.pool, assignee_id).await?;
    }

    let alert = AlertRepo::create(&state.pool, &input).await?;

    tracing::info!(
        alert_id = alert.id,
        level = alert.level,
        user_id = auth.user_id,
        "Alert raised",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(alert, "Alert created")),
    ))
}

/// POST /api/alert/process
pub async fn process(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<IdRequest>,
) -> AppResult<Json<ApiResponse<Alert>>> {
    let alert = AlertRepo::set_status(&state.pool, input.id, alert_status::PROCESSED)
        .await?
        .ok_or_else(|| not_found("Alert", input.id))?;
    tracing::info!(alert_id = alert.id, user_id = auth.user_id, "Alert processed");
    Ok(Json(ApiResponse::with_message(alert, "Alert processed")))
}

/// POST /api/alert/ignore
pub async fn ignore(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<IdRequest>,
) -> AppResult<Json<ApiResponse<Alert>>> {
    let alert = AlertRepo::set_status(&state.pool, input.id, alert_status::IGNORED)
        .await?
        .ok_or_else(|| not_found("Alert", input.id))?;
    tracing::info!(alert_id = alert.id, user_id = auth.user_id, "Alert ignored");
    Ok(Json(ApiResponse::with_message(alert, "Alert ignored")))
}

/// POST /api/alert/assign
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<AssignAlert>,
) -> AppResult<Json<ApiResponse<Alert>>> {
    ensure_user_exists(&state.pool, input.assignee_id).await?;
    let alert = AlertRepo::assign(&state.pool, input.id, input.assignee_id)
        .await?
        .ok_or_else(|| not_found("Alert", input.id))?;

    tracing::info!(
        alert_id = alert.id,
        assignee_id = input.assignee_id,
        user_id = auth.user_id,
        "Alert assigned",
    );

    Ok(Json(ApiResponse::with_message(alert, "Alert assigned")))
}
