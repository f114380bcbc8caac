//! Repository for the append-only `operation_logs` table.

use farmops_core::query::PageRequest;
use farmops_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::operation_log::{CreateOperationLog, OperationLog, OperationLogQuery};

const COLUMNS: &str = "id, user_id, username, operation_type, module, description, \
                       request_url, request_method, request_params, response_data, \
                       status, ip, browser, os, created_at";

/// Provides insert, query and purge operations for operation logs.
pub struct OperationLogRepo;

impl OperationLogRepo {
    /// Append a log entry. Returns the new row's id.
    pub async fn insert(pool: &PgPool, entry: &CreateOperationLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO operation_logs (
                user_id, username, operation_type, module, description,
                request_url, request_method, request_params, response_data,
                status, ip, browser, os)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING id",
        )
        .bind(entry.user_id)
        .bind(&entry.username)
        .bind(&entry.operation_type)
        .bind(&entry.module)
        .bind(&entry.description)
        .bind(&entry.request_url)
        .bind(&entry.request_method)
        .bind(&entry.request_params)
        .bind(&entry.response_data)
        .bind(&entry.status)
        .bind(&entry.ip)
        .bind(&entry.browser)
        .bind(&entry.os)
        .fetch_one(pool)
        .await
    }

    /// List one page of entries matching `params`, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &OperationLogQuery,
        page: PageRequest,
    ) -> Result<Vec<OperationLog>, sqlx::Error> {
        let filter = build_log_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM operation_logs {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, OperationLog>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Every entry matching `params` (for export).
    pub async fn list_all(
        pool: &PgPool,
        params: &OperationLogQuery,
    ) -> Result<Vec<OperationLog>, sqlx::Error> {
        let filter = build_log_filter(params);
        let query = format!(
            "SELECT {COLUMNS} FROM operation_logs {} ORDER BY created_at DESC, id DESC",
            filter.where_clause()
        );
        filter
            .bind_as(sqlx::query_as::<_, OperationLog>(&query))
            .fetch_all(pool)
            .await
    }

    /// Count entries matching `params`.
    pub async fn count(pool: &PgPool, params: &OperationLogQuery) -> Result<i64, sqlx::Error> {
        let filter = build_log_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM operation_logs {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Delete the given entries. Returns how many rows were removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM operation_logs WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every entry. Returns how many rows were removed.
    pub async fn clear(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM operation_logs").execute(pool).await?;
        Ok(result.rows_affected())
    }
}

fn build_log_filter(params: &OperationLogQuery) -> Filter {
    let mut filter = Filter::new();
    filter.contains("username", params.username.as_deref());
    filter.contains("module", params.module.as_deref());
    filter.eq_text("operation_type", params.operation_type.as_deref());
    filter.eq_text("status", params.status.as_deref());
    filter.time_range("created_at", params.start_time, params.end_time);
    filter
}
