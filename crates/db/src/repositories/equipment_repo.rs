//! Repository for the `equipment` table.

use farmops_core::equipment::{equipment_status, BATTERY_LOW_BELOW, BATTERY_MEDIUM_BELOW};
use farmops_core::query::PageRequest;
use farmops_core::statistics::BatteryStats;
use farmops_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment};

/// Column list for joined SELECT queries (`e` = equipment).
const COLUMNS: &str = "\
    e.id, e.name, e.equipment_type, e.model, e.serial_number, e.status, \
    e.field_id, f.name AS field_name, e.section_id, s.name AS section_name, \
    e.location, e.battery_level, e.ip_address, e.manufacturer, e.description, \
    e.install_time, e.last_report_time, e.last_maintenance_time, \
    e.next_maintenance_time, e.purchase_date, e.created_at, e.updated_at";

const JOINS: &str = "\
    LEFT JOIN fields f ON f.id = e.field_id \
    LEFT JOIN field_sections s ON s.id = e.section_id";

/// Provides CRUD, listing and aggregation for equipment.
pub struct EquipmentRepo;

impl EquipmentRepo {
    /// Insert a new device, returning the created row with joined names.
    pub async fn create(pool: &PgPool, input: &CreateEquipment) -> Result<Equipment, sqlx::Error> {
        let query = format!(
            "WITH e AS (
                INSERT INTO equipment (
                    name, equipment_type, model, serial_number, status, field_id,
                    section_id, location, battery_level, ip_address, manufacturer,
                    description, install_time, last_report_time,
                    last_maintenance_time, next_maintenance_time, purchase_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                RETURNING *
             )
             SELECT {COLUMNS} FROM e {JOINS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(&input.name)
            .bind(input.equipment_type)
            .bind(&input.model)
            .bind(&input.serial_number)
            .bind(input.status)
            .bind(input.field_id)
            .bind(input.section_id)
            .bind(&input.location)
            .bind(input.battery_level)
            .bind(&input.ip_address)
            .bind(&input.manufacturer)
            .bind(&input.description)
            .bind(input.install_time)
            .bind(input.last_report_time)
            .bind(input.last_maintenance_time)
            .bind(input.next_maintenance_time)
            .bind(input.purchase_date)
            .fetch_one(pool)
            .await
    }

    /// Find a device by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM equipment e {JOINS} WHERE e.id = $1");
        sqlx::query_as::<_, Equipment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a device with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM equipment WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether `serial_number` is taken by a device other than `except_id`.
    pub async fn serial_number_taken(
        pool: &PgPool,
        serial_number: &str,
        except_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM equipment
                WHERE serial_number = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(serial_number)
        .bind(except_id)
        .fetch_one(pool)
        .await
    }

    /// List one page of devices matching `params`, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &EquipmentQuery,
        page: PageRequest,
    ) -> Result<Vec<Equipment>, sqlx::Error> {
        let filter = build_equipment_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM equipment e {JOINS} {} \
             ORDER BY e.created_at DESC, e.id DESC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Equipment>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Every device matching `params` (for export).
    pub async fn list_all(
        pool: &PgPool,
        params: &EquipmentQuery,
    ) -> Result<Vec<Equipment>, sqlx::Error> {
        let filter = build_equipment_filter(params);
        let query = format!(
            "SELECT {COLUMNS} FROM equipment e {JOINS} {} ORDER BY e.created_at DESC, e.id DESC",
            filter.where_clause()
        );
        filter
            .bind_as(sqlx::query_as::<_, Equipment>(&query))
            .fetch_all(pool)
            .await
    }

    /// Count devices matching `params`.
    pub async fn count(pool: &PgPool, params: &EquipmentQuery) -> Result<i64, sqlx::Error> {
        let filter = build_equipment_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM equipment e {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// `(status, count)` rows, optionally restricted to one field.
    pub async fn count_by_status(
        pool: &PgPool,
        field_id: Option<DbId>,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (i32, i64)>(
            "SELECT status, COUNT(*)::BIGINT FROM equipment
             WHERE ($1::BIGINT IS NULL OR field_id = $1)
             GROUP BY status ORDER BY status",
        )
        .bind(field_id)
        .fetch_all(pool)
        .await
    }

    /// `(equipment_type, count)` rows, optionally restricted to one field.
    pub async fn count_by_type(
        pool: &PgPool,
        field_id: Option<DbId>,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (i32, i64)>(
            "SELECT equipment_type, COUNT(*)::BIGINT FROM equipment
             WHERE ($1::BIGINT IS NULL OR field_id = $1)
             GROUP BY equipment_type ORDER BY equipment_type",
        )
        .bind(field_id)
        .fetch_all(pool)
        .await
    }

    /// Battery distribution, optionally restricted to one field.
    pub async fn battery_stats(
        pool: &PgPool,
        field_id: Option<DbId>,
    ) -> Result<BatteryStats, sqlx::Error> {
        let (low, medium, high, no_data) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            "SELECT
                COUNT(*) FILTER (WHERE battery_level < $2),
                COUNT(*) FILTER (WHERE battery_level >= $2 AND battery_level < $3),
                COUNT(*) FILTER (WHERE battery_level >= $3),
                COUNT(*) FILTER (WHERE battery_level IS NULL)
             FROM equipment
             WHERE ($1::BIGINT IS NULL OR field_id = $1)",
        )
        .bind(field_id)
        .bind(BATTERY_LOW_BELOW)
        .bind(BATTERY_MEDIUM_BELOW)
        .fetch_one(pool)
        .await?;
        Ok(BatteryStats {
            low,
            medium,
            high,
            no_data,
        })
    }

    /// Number of online devices, optionally restricted to one field.
    pub async fn count_online(pool: &PgPool, field_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM equipment
             WHERE status = $2 AND ($1::BIGINT IS NULL OR field_id = $1)",
        )
        .bind(field_id)
        .bind(equipment_status::ONLINE)
        .fetch_one(pool)
        .await
    }

    /// Update a device. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        input: &UpdateEquipment,
    ) -> Result<Option<Equipment>, sqlx::Error> {
        let query = format!(
            "WITH e AS (
                UPDATE equipment SET
                    name = COALESCE($2, name),
                    equipment_type = COALESCE($3, equipment_type),
                    model = COALESCE($4, model),
                    serial_number = COALESCE($5, serial_number),
                    status = COALESCE($6, status),
                    field_id = COALESCE($7, field_id),
                    section_id = COALESCE($8, section_id),
                    location = COALESCE($9, location),
                    battery_level = COALESCE($10, battery_level),
                    ip_address = COALESCE($11, ip_address),
                    manufacturer = COALESCE($12, manufacturer),
                    description = COALESCE($13, description),
                    install_time = COALESCE($14, install_time),
                    last_report_time = COALESCE($15, last_report_time),
                    last_maintenance_time = COALESCE($16, last_maintenance_time),
                    next_maintenance_time = COALESCE($17, next_maintenance_time),
                    purchase_date = COALESCE($18, purchase_date)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM e {JOINS}"
        );
        sqlx::query_as::<_, Equipment>(&query)
            .bind(input.id)
            .bind(&input.name)
            .bind(input.equipment_type)
            .bind(&input.model)
            .bind(&input.serial_number)
            .bind(input.status)
            .bind(input.field_id)
            .bind(input.section_id)
            .bind(&input.location)
            .bind(input.battery_level)
            .bind(&input.ip_address)
            .bind(&input.manufacturer)
            .bind(&input.description)
            .bind(input.install_time)
            .bind(input.last_report_time)
            .bind(input.last_maintenance_time)
            .bind(input.next_maintenance_time)
            .bind(input.purchase_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a device. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn build_equipment_filter(params: &EquipmentQuery) -> Filter {
    let mut filter = Filter::new();
    filter.contains_any(
        &["e.name", "e.model", "e.serial_number"],
        params.keyword.as_deref(),
    );
    filter.eq_i32("e.equipment_type", params.equipment_type);
    filter.eq_i32("e.status", params.status);
    filter.eq_i64("e.field_id", params.field_id);
    filter.eq_i64("e.section_id", params.section_id);
    filter
}
