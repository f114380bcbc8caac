//! Repository for `roles`, `permissions` and `role_permissions`.
//!
//! Roles are always read together with their permission names, aggregated
//! into a `TEXT[]`. Writes that touch `role_permissions` run in one
//! transaction.

use farmops_core::query::PageRequest;
use farmops_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::filter::Filter;
use crate::models::role::{CreateRole, Role, RoleQuery, UpdateRole};

/// Select list with aggregated permission names (`r` = roles).
const COLUMNS: &str = "\
    r.id, r.name, r.description, \
    COALESCE(array_agg(p.name ORDER BY p.name) FILTER (WHERE p.name IS NOT NULL), '{}') \
        AS permissions, \
    r.created_at, r.updated_at";

const JOINS: &str = "\
    LEFT JOIN role_permissions rp ON rp.role_id = r.id \
    LEFT JOIN permissions p ON p.id = rp.permission_id";

const GROUP_BY: &str = "GROUP BY r.id";

/// Provides CRUD operations for roles and their permission sets.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a role and grant it `permissions`, creating unknown names.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let role_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_permissions_inner(&mut tx, role_id, &input.permissions).await?;

        tx.commit().await?;
        Self::find_by_id(pool, role_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles r {JOINS} WHERE r.id = $1 {GROUP_BY}");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `name` is used by a role other than `except_id`.
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        except_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM roles WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(name)
        .bind(except_id)
        .fetch_one(pool)
        .await
    }

    /// List one page of roles ordered by id.
    pub async fn list(
        pool: &PgPool,
        params: &RoleQuery,
        page: PageRequest,
    ) -> Result<Vec<Role>, sqlx::Error> {
        let filter = build_role_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {COLUMNS} FROM roles r {JOINS} {} {GROUP_BY} \
             ORDER BY r.id ASC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Role>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count roles matching `params`.
    pub async fn count(pool: &PgPool, params: &RoleQuery) -> Result<i64, sqlx::Error> {
        let filter = build_role_filter(params);
        let query = format!("SELECT COUNT(*)::BIGINT FROM roles r {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a role, replacing its name, description and grants.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, input: &UpdateRole) -> Result<Option<Role>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_scalar::<_, DbId>(
            "UPDATE roles SET name = $2, description = $3 WHERE id = $1
             RETURNING id",
        )
        .bind(input.id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(role_id) = updated else {
            return Ok(None);
        };
        Self::set_permissions_inner(&mut tx, role_id, &input.permissions).await?;

        tx.commit().await?;
        Self::find_by_id(pool, role_id).await
    }

    /// Delete a role. Grants and user assignments cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Role names from `names` that do not exist.
    pub async fn missing_names(pool: &PgPool, names: &[String]) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT n FROM unnest($1::TEXT[]) AS n
             WHERE NOT EXISTS (SELECT 1 FROM roles WHERE name = n)
             ORDER BY n",
        )
        .bind(names)
        .fetch_all(pool)
        .await
    }

    /// Distinct permission names granted to a user through all of their roles.
    pub async fn permissions_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT p.name
             FROM user_roles ur
             JOIN role_permissions rp ON rp.role_id = ur.role_id
             JOIN permissions p ON p.id = rp.permission_id
             WHERE ur.user_id = $1
             ORDER BY p.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Replace a role's grants with `names`, inserting unknown permission names.
    async fn set_permissions_inner(
        tx: &mut Transaction<'_, Postgres>,
        role_id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO permissions (name)
             SELECT DISTINCT unnest($1::TEXT[])
             ON CONFLICT ON CONSTRAINT uq_permissions_name DO NOTHING",
        )
        .bind(names)
        .execute(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, id FROM permissions WHERE name = ANY($2)",
        )
        .bind(role_id)
        .bind(names)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

fn build_role_filter(params: &RoleQuery) -> Filter {
    let mut filter = Filter::new();
    filter.contains("r.name", params.name.as_deref());
    filter
}
