use std::str::FromStr;

use anyhow::Context;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` and `JWT_SECRET` has a default suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Maximum pool size (default: `20`).
    pub db_max_connections: u32,
    /// Largest request body the operation log will buffer (default: 2 MiB).
    pub max_body_bytes: usize,
    /// Password applied by `reset-password` when the admin sends none.
    pub default_reset_password: String,
    pub operation_log: OperationLogConfig,
    /// Super-admin created on first start when the users table is empty.
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

/// Settings for the operation-log middleware.
#[derive(Debug, Clone)]
pub struct OperationLogConfig {
    pub enabled: bool,
    /// Characters kept from captured request params and response bodies.
    pub max_capture: usize,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `DB_MAX_CONNECTIONS`        | `20`                    |
    /// | `MAX_BODY_BYTES`            | `2097152`               |
    /// | `DEFAULT_RESET_PASSWORD`    | `123456`                |
    /// | `OPERATION_LOG_ENABLED`     | `true`                  |
    /// | `OPERATION_LOG_MAX_CAPTURE` | `4096`                  |
    /// | `BOOTSTRAP_ADMIN_USERNAME`  | `admin`                 |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`  | unset (no bootstrap)    |
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let bootstrap_admin = std::env::var("BOOTSTRAP_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .map(|password| BootstrapAdmin {
                username: std::env::var("BOOTSTRAP_ADMIN_USERNAME")
                    .unwrap_or_else(|_| "admin".into()),
                password,
            });

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20)?,
            max_body_bytes: env_or("MAX_BODY_BYTES", 2 * 1024 * 1024)?,
            default_reset_password: std::env::var("DEFAULT_RESET_PASSWORD")
                .unwrap_or_else(|_| "123456".into()),
            operation_log: OperationLogConfig {
                enabled: env_or("OPERATION_LOG_ENABLED", true)?,
                max_capture: env_or("OPERATION_LOG_MAX_CAPTURE", 4096)?,
            },
            bootstrap_admin,
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
pub(crate) fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
