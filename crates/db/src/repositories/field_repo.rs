//! Repository for the `fields` table.

use farmops_core::query::PageRequest;
use farmops_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::field::{CreateField, Field, FieldQuery, UpdateField, DEFAULT_AREA_UNIT};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, address, manager, area, area_unit, status, remark, \
                       created_at, updated_at";

/// Provides CRUD operations for fields.
pub struct FieldRepo;

impl FieldRepo {
    /// Insert a new field, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateField) -> Result<Field, sqlx::Error> {
        let query = format!(
            "INSERT INTO fields (name, address, manager, area, area_unit, status, remark)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 1), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Field>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.manager)
            .bind(input.area)
            .bind(input.area_unit.as_deref().unwrap_or(DEFAULT_AREA_UNIT))
            .bind(input.status)
            .bind(&input.remark)
            .fetch_one(pool)
            .await
    }

    /// Find a field by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Field>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fields WHERE id = $1");
        sqlx::query_as::<_, Field>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a field with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM fields WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List one page of fields matching `params`, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &FieldQuery,
        page: PageRequest,
    ) -> Result<Vec<Field>, sqlx::Error> {
        let filter = build_field_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM fields {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Field>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count fields matching `params` (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &FieldQuery) -> Result<i64, sqlx::Error> {
        let filter = build_field_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM fields {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a field. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, input: &UpdateField) -> Result<Option<Field>, sqlx::Error> {
        let query = format!(
            "UPDATE fields SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                manager = COALESCE($4, manager),
                area = COALESCE($5, area),
                area_unit = COALESCE($6, area_unit),
                status = COALESCE($7, status),
                remark = COALESCE($8, remark)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Field>(&query)
            .bind(input.id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.manager)
            .bind(input.area)
            .bind(&input.area_unit)
            .bind(input.status)
            .bind(&input.remark)
            .fetch_optional(pool)
            .await
    }

    /// Delete a field. Sections, activities and equipment cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn build_field_filter(params: &FieldQuery) -> Filter {
    let mut filter = Filter::new();
    filter.contains("name", params.name.as_deref());
    filter.contains("manager", params.manager.as_deref());
    filter.eq_i32("status", params.status);
    filter
}
