//! First-start provisioning.

use anyhow::{anyhow, Context};
use farmops_core::roles::ROLE_SUPER_ADMIN;
use farmops_db::models::user::CreateUser;
use farmops_db::repositories::UserRepo;
use farmops_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::ServerConfig;

/// Create the configured super-admin when the users table is empty.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(pool: &DbPool, config: &ServerConfig) -> anyhow::Result<bool> {
    let Some(ref admin) = config.bootstrap_admin else {
        return Ok(false);
    };
    if UserRepo::count_all(pool).await? > 0 {
        return Ok(false);
    }

    validate_password_strength(&admin.password)
        .map_err(|msg| anyhow!("BOOTSTRAP_ADMIN_PASSWORD rejected: {msg}"))?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| anyhow!("Failed to hash bootstrap password: {e}"))?;

    let dto = CreateUser {
        username: admin.username.clone(),
        password_hash,
        real_name: "Administrator".to_string(),
        phone: None,
        department: None,
    };
    let user = UserRepo::create(pool, &dto, &[ROLE_SUPER_ADMIN.to_string()])
        .await
        .context("Failed to create bootstrap administrator")?;

    tracing::info!(user_id = user.id, username = %user.username, "Bootstrap administrator created");
    Ok(true)
}
