//! Repository for the `activities` table.
//!
//! Reads always join `fields` and `field_sections` so responses carry the
//! display names; inserts and updates go through a CTE to return the same
//! joined shape in one round trip.

use farmops_core::activity::sort_column;
use farmops_core::query::PageRequest;
use farmops_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::activity::{Activity, ActivityQuery, CreateActivity, UpdateActivity};

/// Column list for joined SELECT queries (`a` = activities).
const COLUMNS: &str = "\
    a.id, a.field_id, f.name AS field_name, a.section_id, s.name AS section_name, \
    a.title, a.activity_type, a.description, a.start_time, a.end_time, a.status, \
    a.executor, a.materials, a.data_source, a.weather_info, a.effect_description, \
    a.images, a.remark, a.created_at, a.updated_at";

/// Joins supplying `field_name` / `section_name`.
const JOINS: &str = "\
    LEFT JOIN fields f ON f.id = a.field_id \
    LEFT JOIN field_sections s ON s.id = a.section_id";

/// Provides CRUD, listing and aggregation for farming activities.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a new activity, returning the created row with joined names.
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "WITH a AS (
                INSERT INTO activities (
                    field_id, section_id, title, activity_type, description,
                    start_time, end_time, status, executor, materials,
                    data_source, weather_info, effect_description, images, remark)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, '{{}}'::TEXT[]),
                        COALESCE($11, 0), $12, $13, COALESCE($14, '{{}}'::TEXT[]), $15)
                RETURNING *
             )
             SELECT {COLUMNS} FROM a {JOINS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.field_id)
            .bind(input.section_id)
            .bind(&input.title)
            .bind(input.activity_type)
            .bind(&input.description)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.status)
            .bind(&input.executor)
            .bind(&input.materials)
            .bind(input.data_source)
            .bind(&input.weather_info)
            .bind(&input.effect_description)
            .bind(&input.images)
            .bind(&input.remark)
            .fetch_one(pool)
            .await
    }

    /// Find an activity by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities a {JOINS} WHERE a.id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of activities matching `params`.
    ///
    /// Sorting follows `sortBy` / `sortOrder`; unknown sort keys fall back to
    /// newest first (handlers reject them before this point).
    pub async fn list(
        pool: &PgPool,
        params: &ActivityQuery,
        page: PageRequest,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let filter = build_activity_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM activities a {JOINS} {} \
             ORDER BY {} \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            order_clause(params),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Activity>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Every activity matching `params`, in list order (for export).
    pub async fn list_all(
        pool: &PgPool,
        params: &ActivityQuery,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let filter = build_activity_filter(params);
        let query = format!(
            "SELECT {COLUMNS} FROM activities a {JOINS} {} ORDER BY {}",
            filter.where_clause(),
            order_clause(params),
        );
        filter
            .bind_as(sqlx::query_as::<_, Activity>(&query))
            .fetch_all(pool)
            .await
    }

    /// Count activities matching `params`.
    pub async fn count(pool: &PgPool, params: &ActivityQuery) -> Result<i64, sqlx::Error> {
        let filter = build_activity_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM activities a {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// `(activity_type, count)` rows for activities matching `params`.
    pub async fn count_by_type(
        pool: &PgPool,
        params: &ActivityQuery,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        Self::count_grouped(pool, params, "a.activity_type").await
    }

    /// `(status, count)` rows for activities matching `params`.
    pub async fn count_by_status(
        pool: &PgPool,
        params: &ActivityQuery,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        Self::count_grouped(pool, params, "a.status").await
    }

    /// `(month 1..=12, count)` rows keyed on the start time's month.
    pub async fn count_by_month(
        pool: &PgPool,
        params: &ActivityQuery,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        Self::count_grouped(pool, params, "EXTRACT(MONTH FROM a.start_time)::INT").await
    }

    async fn count_grouped(
        pool: &PgPool,
        params: &ActivityQuery,
        key: &str,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        let filter = build_activity_filter(params);
        let query = format!(
            "SELECT {key} AS bucket, COUNT(*)::BIGINT AS count FROM activities a {} \
             GROUP BY 1 ORDER BY 1",
            filter.where_clause()
        );
        filter
            .bind_as(sqlx::query_as::<_, (i32, i64)>(&query))
            .fetch_all(pool)
            .await
    }

    /// Update an activity. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateActivity,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "WITH a AS (
                UPDATE activities SET
                    field_id = COALESCE($2, field_id),
                    section_id = COALESCE($3, section_id),
                    title = COALESCE($4, title),
                    activity_type = COALESCE($5, activity_type),
                    description = COALESCE($6, description),
                    start_time = COALESCE($7, start_time),
                    end_time = COALESCE($8, end_time),
                    status = COALESCE($9, status),
                    executor = COALESCE($10, executor),
                    materials = COALESCE($11, materials),
                    data_source = COALESCE($12, data_source),
                    weather_info = COALESCE($13, weather_info),
                    effect_description = COALESCE($14, effect_description),
                    images = COALESCE($15, images),
                    remark = COALESCE($16, remark)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM a {JOINS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(input.field_id)
            .bind(input.section_id)
            .bind(&input.title)
            .bind(input.activity_type)
            .bind(&input.description)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.status)
            .bind(&input.executor)
            .bind(&input.materials)
            .bind(input.data_source)
            .bind(&input.weather_info)
            .bind(&input.effect_description)
            .bind(&input.images)
            .bind(&input.remark)
            .fetch_optional(pool)
            .await
    }

    /// Delete an activity. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

fn build_activity_filter(params: &ActivityQuery) -> Filter {
    let mut filter = Filter::new();
    filter.eq_i64("a.field_id", params.field_id);
    filter.eq_i64("a.section_id", params.section_id);
    filter.eq_i32("a.activity_type", params.activity_type);
    filter.eq_i32("a.status", params.status);
    filter.contains("a.executor", params.executor.as_deref());
    filter.time_range("a.start_time", params.start_date, params.end_date);
    filter
}

fn order_clause(params: &ActivityQuery) -> String {
    let column = params
        .sort_by
        .as_deref()
        .and_then(sort_column)
        .unwrap_or("created_at");
    let direction = match params.sort_order.as_deref() {
        Some(order) if order.eq_ignore_ascii_case("asc") => "ASC",
        _ => "DESC",
    };
    format!("a.{column} {direction}, a.id {direction}")
}
