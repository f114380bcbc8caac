//! JWT-based authentication extractor for Axum handlers.
//!
//! A valid signature is not enough: the account behind the token must still
//! exist and be enabled, so disabling a user takes effect immediately.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use farmops_core::error::CoreError;
use farmops_core::roles::user_status;
use farmops_core::types::DbId;
use farmops_db::repositories::UserRepo;

use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    pub username: String,
    /// Role names carried by the token.
    pub roles: Vec<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        match UserRepo::find_status(&state.pool, claims.sub).await? {
            Some(user_status::ENABLED) => Ok(claims.into()),
            Some(_) => Err(AppError::Core(CoreError::Forbidden(
                "Account is disabled".into(),
            ))),
            None => Err(AppError::Core(CoreError::Unauthorized(
                "Account no longer exists".into(),
            ))),
        }
    }
}

/// Best-effort identification from request headers, without rejecting.
///
/// Used by the operation log, which records anonymous calls too.
pub fn identify(headers: &HeaderMap, config: &JwtConfig) -> Option<AuthUser> {
    let token = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    validate_token(token, config).ok().map(AuthUser::from)
}
