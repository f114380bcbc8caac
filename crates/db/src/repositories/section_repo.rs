//! Repository for the `field_sections` table.

use farmops_core::types::DbId;
use sqlx::PgPool;

use crate::models::field::DEFAULT_AREA_UNIT;
use crate::models::section::{CreateFieldSection, FieldSection, UpdateFieldSection};

const COLUMNS: &str = "id, field_id, name, area, area_unit, crop_type, status, remark, \
                       created_at, updated_at";

/// Provides CRUD operations for field sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Insert a new section, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFieldSection,
    ) -> Result<FieldSection, sqlx::Error> {
        let query = format!(
            "INSERT INTO field_sections (field_id, name, area, area_unit, crop_type, status, remark)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 1), $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FieldSection>(&query)
            .bind(input.field_id)
            .bind(&input.name)
            .bind(input.area)
            .bind(input.area_unit.as_deref().unwrap_or(DEFAULT_AREA_UNIT))
            .bind(&input.crop_type)
            .bind(input.status)
            .bind(&input.remark)
            .fetch_one(pool)
            .await
    }

    /// Find a section by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FieldSection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM field_sections WHERE id = $1");
        sqlx::query_as::<_, FieldSection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every section of one field, oldest first.
    pub async fn list_by_field(
        pool: &PgPool,
        field_id: DbId,
    ) -> Result<Vec<FieldSection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM field_sections WHERE field_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, FieldSection>(&query)
            .bind(field_id)
            .fetch_all(pool)
            .await
    }

    /// List the sections of several fields at once (for embedding in field lists).
    pub async fn list_by_fields(
        pool: &PgPool,
        field_ids: &[DbId],
    ) -> Result<Vec<FieldSection>, sqlx::Error> {
        if field_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM field_sections WHERE field_id = ANY($1) ORDER BY created_at, id"
        );
        sqlx::query_as::<_, FieldSection>(&query)
            .bind(field_ids)
            .fetch_all(pool)
            .await
    }

    /// Update a section. Only non-`None` fields in `input` are applied.
    ///
    /// When the section moves to another field, the activities, equipment
    /// and alerts placed on it move with it in the same transaction.
    pub async fn update(
        pool: &PgPool,
        input: &UpdateFieldSection,
    ) -> Result<Option<FieldSection>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE field_sections SET
                field_id = COALESCE($2, field_id),
                name = COALESCE($3, name),
                area = COALESCE($4, area),
                area_unit = COALESCE($5, area_unit),
                crop_type = COALESCE($6, crop_type),
                status = COALESCE($7, status),
                remark = COALESCE($8, remark)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, FieldSection>(&query)
            .bind(input.id)
            .bind(input.field_id)
            .bind(&input.name)
            .bind(input.area)
            .bind(&input.area_unit)
            .bind(&input.crop_type)
            .bind(input.status)
            .bind(&input.remark)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(section) = updated else {
            return Ok(None);
        };
        if input.field_id.is_some() {
            for statement in [
                "UPDATE activities SET field_id = $2 WHERE section_id = $1 AND field_id <> $2",
                "UPDATE equipment SET field_id = $2 WHERE section_id = $1 AND field_id <> $2",
                "UPDATE alerts SET field_id = $2 WHERE section_id = $1 AND field_id <> $2",
            ] {
                sqlx::query(statement)
                    .bind(section.id)
                    .bind(section.field_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(section))
    }

    /// Delete a section. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM field_sections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
