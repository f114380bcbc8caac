//! Repository for the `alerts` table.

use farmops_core::alert::{alert_status, MONTH_WINDOW_DAYS, WEEK_WINDOW_DAYS};
use farmops_core::query::PageRequest;
use farmops_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::alert::{Alert, AlertQuery, CreateAlert};

/// Column list for joined SELECT queries (`al` = alerts).
const COLUMNS: &str = "\
    al.id, al.title, al.content, al.level, al.status, al.alert_type, al.source, \
    al.field_id, f.name AS field_name, al.section_id, s.name AS section_name, \
    al.equipment_id, eq.name AS equipment_name, \
    al.assignee_id, u.real_name AS assignee_name, \
    al.handle_time, al.created_at, al.updated_at";

const JOINS: &str = "\
    LEFT JOIN fields f ON f.id = al.field_id \
    LEFT JOIN field_sections s ON s.id = al.section_id \
    LEFT JOIN equipment eq ON eq.id = al.equipment_id \
    LEFT JOIN users u ON u.id = al.assignee_id";

/// Counts over a created-at window, as returned by [`AlertRepo::window_counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    pub today: i64,
    pub week: i64,
    pub month: i64,
}

/// Provides creation, listing, state changes and aggregation for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new pending alert.
    pub async fn create(pool: &PgPool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "WITH al AS (
                INSERT INTO alerts (
                    title, content, level, status, alert_type, source,
                    field_id, section_id, equipment_id, assignee_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
             )
             SELECT {COLUMNS} FROM al {JOINS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.level)
            .bind(alert_status::PENDING)
            .bind(&input.alert_type)
            .bind(&input.source)
            .bind(input.field_id)
            .bind(input.section_id)
            .bind(input.equipment_id)
            .bind(input.assignee_id)
            .fetch_one(pool)
            .await
    }

    /// Find an alert by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts al {JOINS} WHERE al.id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of alerts matching `params`, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &AlertQuery,
        page: PageRequest,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let filter = build_alert_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM alerts al {JOINS} {} \
             ORDER BY al.created_at DESC, al.id DESC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Alert>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count alerts matching `params`.
    pub async fn count(pool: &PgPool, params: &AlertQuery) -> Result<i64, sqlx::Error> {
        let filter = build_alert_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM alerts al {JOINS} {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Move an alert to `status` and stamp `handle_time`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: i32,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "WITH al AS (
                UPDATE alerts SET status = $2, handle_time = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM al {JOINS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Hand an alert to a user.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        assignee_id: DbId,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "WITH al AS (
                UPDATE alerts SET assignee_id = $2
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM al {JOINS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(assignee_id)
            .fetch_optional(pool)
            .await
    }

    /// `(status, count)` rows for alerts created within the optional range.
    pub async fn count_by_status(
        pool: &PgPool,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        Self::count_grouped(pool, "status", from, to).await
    }

    /// `(level, count)` rows for alerts created within the optional range.
    pub async fn count_by_level(
        pool: &PgPool,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        Self::count_grouped(pool, "level", from, to).await
    }

    /// Alerts created since midnight today and over the rolling week / month.
    pub async fn window_counts(pool: &PgPool) -> Result<WindowCounts, sqlx::Error> {
        let (today, week, month) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT
                COUNT(*) FILTER (WHERE created_at >= date_trunc('day', NOW())),
                COUNT(*) FILTER (WHERE created_at >= NOW() - make_interval(days => $1)),
                COUNT(*) FILTER (WHERE created_at >= NOW() - make_interval(days => $2))
             FROM alerts",
        )
        .bind(WEEK_WINDOW_DAYS as i32)
        .bind(MONTH_WINDOW_DAYS as i32)
        .fetch_one(pool)
        .await?;
        Ok(WindowCounts { today, week, month })
    }

    async fn count_grouped(
        pool: &PgPool,
        column: &str,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        let mut filter = Filter::new();
        filter.time_range("created_at", from, to);
        let query = format!(
            "SELECT {column}, COUNT(*)::BIGINT FROM alerts {} GROUP BY {column} ORDER BY {column}",
            filter.where_clause()
        );
        filter
            .bind_as(sqlx::query_as::<_, (i32, i64)>(&query))
            .fetch_all(pool)
            .await
    }
}

fn build_alert_filter(params: &AlertQuery) -> Filter {
    let mut filter = Filter::new();
    filter.contains_any(
        &["al.title", "al.content", "eq.name"],
        params.keyword.as_deref(),
    );
    filter.eq_i32("al.status", params.status);
    filter.eq_i32("al.level", params.level);
    filter.eq_i64("al.assignee_id", params.assignee_id);
    filter.time_range("al.created_at", params.start_time, params.end_time);
    filter
}
