//! Handlers for the `/activity` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use farmops_core::activity::{activity_status, activity_type, data_source, sort_column};
use farmops_core::error::{ensure_known_code, CoreError};
use farmops_core::query::PageRequest;
use farmops_core::statistics::{month_buckets, zero_filled};
use farmops_core::types::{DbId, Timestamp};
use farmops_db::models::activity::{
    Activity, ActivityQuery, ActivityStatistics, CreateActivity, UpdateActivity,
};
use farmops_db::repositories::ActivityRepo;

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

fn validate_codes(
    kind: Option<i32>,
    status: Option<i32>,
    source: Option<i32>,
) -> Result<(), CoreError> {
    if let Some(code) = kind {
        ensure_known_code("activity type", code, activity_type::ALL)?;
    }
    if let Some(code) = status {
        ensure_known_code("activity status", code, activity_status::ALL)?;
    }
    if let Some(code) = source {
        ensure_known_code("data source", code, data_source::ALL)?;
    }
    Ok(())
}

fn validate_time_order(start: Timestamp, end: Option<Timestamp>) -> Result<(), CoreError> {
    match end {
        Some(end) if end < start => Err(CoreError::Validation(
            "endTime must not be earlier than startTime".into(),
        )),
        _ => Ok(()),
    }
}

fn validate_sort(params: &ActivityQuery) -> AppResult<()> {
    if let Some(ref key) = params.sort_by {
        if sort_column(key).is_none() {
            return Err(AppError::BadRequest(format!("Unsupported sortBy: {key}")));
        }
    }
    if let Some(ref order) = params.sort_order {
        if !order.eq_ignore_ascii_case("asc") && !order.eq_ignore_ascii_case("desc") {
            return Err(AppError::BadRequest(format!("Unsupported sortOrder: {order}")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/activity/list
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ActivityQuery>,
) -> AppResult<Json<ApiResponse<PageData<Activity>>>> {
    validate_sort(&params)?;
    let page = PageRequest::new(params.page, params.page_size);
    let items = ActivityRepo::list(&state.pool, &params, page).await?;
    let total = ActivityRepo::count(&state.pool, &params).await?;
    Ok(Json(ApiResponse::ok(PageData::new(items, total, page))))
}

/// GET /api/activity/statistics
///
/// Honors `fieldId`, `startDate` and `endDate`; other list filters are ignored.
pub async fn statistics(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ActivityQuery>,
) -> AppResult<Json<ApiResponse<ActivityStatistics>>> {
    let scope = ActivityQuery {
        field_id: params.field_id,
        start_date: params.start_date,
        end_date: params.end_date,
        ..Default::default()
    };

    let by_type = ActivityRepo::count_by_type(&state.pool, &scope).await?;
    let by_status = ActivityRepo::count_by_status(&state.pool, &scope).await?;
    let by_month = ActivityRepo::count_by_month(&state.pool, &scope).await?;
    let total_count = ActivityRepo::count(&state.pool, &scope).await?;

    Ok(Json(ApiResponse::ok(ActivityStatistics {
        by_type: zero_filled(activity_type::ALL, &by_type),
        by_status: zero_filled(activity_status::ALL, &by_status),
        by_month: month_buckets(&by_month),
        total_count,
    })))
}

/// GET /api/activity/export?format=csv|json
pub async fn export_activities(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(params): QueryParams<ActivityQuery>,
    QueryParams(options): QueryParams<ExportParams>,
) -> AppResult<Response> {
    validate_sort(&params)?;
    let rows = ActivityRepo::list_all(&state.pool, &params).await?;
    tracing::info!(rows = rows.len(), format = ?options.format, "Activities exported");
    export(options.format, "activities", rows)
}

/// GET /api/activity/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Activity>>> {
    let activity = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Activity", id))?;
    Ok(Json(ApiResponse::ok(activity)))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/activity/create
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateActivity>,
) -> AppResult<(StatusCode, Json<ApiResponse<Activity>>)> {
    validate_codes(Some(input.activity_type), Some(input.status), input.data_source)?;
    validate_time_order(input.start_time, input.end_time)?;
    ensure_placement(&state.pool, input.field_id, input.section_id).await?;

    let activity = ActivityRepo::create(&state.pool, &input).await?;

    tracing::info!(
        activity_id = activity.id,
        field_id = activity.field_id,
        user_id = auth.user_id,
        "Activity created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(activity, "Activity created")),
    ))
}

/// PUT /api/activity/{id}
///
/// Field, section and time checks run against the merged record.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateActivity>,
) -> AppResult<Json<ApiResponse<Activity>>> {
    let current = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found("Activity", id))?;

    validate_codes(input.activity_type, input.status, input.data_source)?;
    validate_time_order(
        input.start_time.unwrap_or(current.start_time),
        input.end_time.or(current.end_time),
    )?;
    if input.field_id.is_some() || input.section_id.is_some() {
        ensure_placement(
            &state.pool,
            input.field_id.unwrap_or(current.field_id),
            input.section_id.or(current.section_id),
        )
        .await?;
    }

    let activity = ActivityRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("Activity", id))?;

    tracing::info!(activity_id = id, user_id = auth.user_id, "Activity updated");

    Ok(Json(ApiResponse::with_message(activity, "Activity updated")))
}

/// DELETE /api/activity/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    delete_activity(&state, &auth, id).await
}

/// DELETE /api/activity/delete
pub async fn delete_by_body(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<IdRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    delete_activity(&state, &auth, input.id).await
}

async fn delete_activity(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<Json<ApiResponse<()>>> {
    if !ActivityRepo::delete(&state.pool, id).await? {
        return Err(not_found("Activity", id));
    }
    tracing::info!(activity_id = id, user_id = auth.user_id, "Activity deleted");
    Ok(Json(ApiResponse::with_message((), "Activity deleted")))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn end_before_start_is_rejected() {
        let start = Utc::now();
        assert!(validate_time_order(start, Some(start - Duration::hours(1))).is_err());
        assert!(validate_time_order(start, Some(start)).is_ok());
        assert!(validate_time_order(start, None).is_ok());
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(validate_codes(Some(activity_type::OTHER), Some(0), None).is_ok());
        assert!(validate_codes(Some(42), None, None).is_err());
        assert!(validate_codes(None, Some(9), None).is_err());
        assert!(validate_codes(None, None, Some(3)).is_err());
    }

    #[test]
    fn sort_keys_are_checked() {
        let ok = ActivityQuery {
            sort_by: Some("startTime".into()),
            sort_order: Some("ASC".into()),
            ..Default::default()
        };
        assert!(validate_sort(&ok).is_ok());

        let bad = ActivityQuery {
            sort_by: Some("password".into()),
            ..Default::default()
        };
        assert!(validate_sort(&bad).is_err());
    }
}
