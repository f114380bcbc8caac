//! Repository for `users` and `user_roles`.

use farmops_core::query::PageRequest;
use farmops_core::roles::ROLE_SUPER_ADMIN;
use farmops_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::filter::{BindValue, Filter};
use crate::models::user::{CreateUser, UpdateUser, User, UserQuery, UserResponse};

/// Column list for full user rows (includes the password hash).
const COLUMNS: &str = "id, username, password_hash, real_name, phone, department, status, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Select list for API responses, with role names aggregated (`u` = users).
const RESPONSE_COLUMNS: &str = "\
    u.id, u.username, u.real_name, u.phone, u.department, u.status, \
    COALESCE(array_agg(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL), '{}') \
        AS roles, \
    u.last_login_at, u.created_at, u.updated_at";

const RESPONSE_JOINS: &str = "\
    LEFT JOIN user_roles ur ON ur.user_id = u.id \
    LEFT JOIN roles r ON r.id = ur.role_id";

/// Provides CRUD operations for user accounts.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user and assign `roles` (by name) in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        roles: &[String],
    ) -> Result<UserResponse, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO users (username, password_hash, real_name, phone, department)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.real_name)
        .bind(&input.phone)
        .bind(&input.department)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_roles_inner(&mut tx, user_id, roles).await?;

        tx.commit().await?;
        Self::find_response(pool, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user's public profile with role names.
    pub async fn find_response(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u {RESPONSE_JOINS} \
             WHERE u.id = $1 GROUP BY u.id"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a user with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Current status of an account, or `None` if it does not exist.
    pub async fn find_status(pool: &PgPool, id: DbId) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>("SELECT status FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the username is already registered.
    pub async fn username_taken(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await
    }

    /// Total number of accounts.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM users")
            .fetch_one(pool)
            .await
    }

    /// List one page of users, newest first.
    ///
    /// With `exclude_super_admins`, accounts holding the super-admin role are
    /// left out.
    pub async fn list(
        pool: &PgPool,
        params: &UserQuery,
        exclude_super_admins: bool,
        page: PageRequest,
    ) -> Result<Vec<UserResponse>, sqlx::Error> {
        let filter = build_user_filter(params, exclude_super_admins);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u {RESPONSE_JOINS} {} GROUP BY u.id \
             ORDER BY u.created_at DESC, u.id DESC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, UserResponse>(&query))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count users matching `params`.
    pub async fn count(
        pool: &PgPool,
        params: &UserQuery,
        exclude_super_admins: bool,
    ) -> Result<i64, sqlx::Error> {
        let filter = build_user_filter(params, exclude_super_admins);
        let query = format!("SELECT COUNT(*)::BIGINT FROM users u {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a profile. A present `roles` list replaces the old assignments.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_scalar::<_, DbId>(
            "UPDATE users SET
                real_name = COALESCE($2, real_name),
                phone = COALESCE($3, phone),
                department = COALESCE($4, department),
                status = COALESCE($5, status)
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .bind(&input.real_name)
        .bind(&input.phone)
        .bind(&input.department)
        .bind(input.status)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(user_id) = updated else {
            return Ok(None);
        };
        if let Some(ref roles) = input.roles {
            Self::set_roles_inner(&mut tx, user_id, roles).await?;
        }

        tx.commit().await?;
        Self::find_response(pool, user_id).await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, failed_login_count = 0, locked_until = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the account status. Returns `true` if the row was updated.
    pub async fn set_status(pool: &PgPool, id: DbId, status: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the failed login counter by 1, returning the new value.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset the failure counter, clear the lock
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn set_roles_inner(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        roles: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             SELECT $1, id FROM roles WHERE name = ANY($2)",
        )
        .bind(user_id)
        .bind(roles)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

fn build_user_filter(params: &UserQuery, exclude_super_admins: bool) -> Filter {
    let mut filter = Filter::new();
    filter.contains("u.username", params.username.as_deref());
    filter.contains("u.real_name", params.real_name.as_deref());
    filter.contains("u.department", params.department.as_deref());
    filter.eq_i32("u.status", params.status);
    if let Some(ref role) = params.role {
        filter.push(
            "EXISTS (SELECT 1 FROM user_roles fr JOIN roles fro ON fro.id = fr.role_id \
             WHERE fr.user_id = u.id AND fro.name = {})",
            BindValue::Text(role.clone()),
        );
    }
    if exclude_super_admins {
        filter.push(
            "NOT EXISTS (SELECT 1 FROM user_roles xr JOIN roles xro ON xro.id = xr.role_id \
             WHERE xr.user_id = u.id AND xro.name = {})",
            BindValue::Text(ROLE_SUPER_ADMIN.to_string()),
        );
    }
    filter
}
