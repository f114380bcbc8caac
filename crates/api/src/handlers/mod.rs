//! Request handlers, one submodule per resource.
//!
//! Handlers validate input, check that referenced rows exist, make one
//! repository call and wrap the result in the success envelope. Errors are
//! mapped through [`AppError`].

pub mod activity;
pub mod alert;
pub mod auth;
pub mod equipment;
pub mod field;
pub mod log;
pub mod menu;
pub mod role;
pub mod section;
pub mod user;

use farmops_core::error::CoreError;
use farmops_core::types::DbId;
use farmops_db::repositories::{FieldRepo, SectionRepo};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Body of the `{ "id": ... }` style endpoints (delete, process, ignore).
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct IdRequest {
    pub id: DbId,
}

pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// Verify that a field exists.
pub(crate) async fn ensure_field_exists(pool: &PgPool, id: DbId) -> AppResult<()> {
    if FieldRepo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(not_found("Field", id))
    }
}

/// Verify that `field_id` exists and that `section_id`, when given, is one
/// of its sections.
pub(crate) async fn ensure_placement(
    pool: &PgPool,
    field_id: DbId,
    section_id: Option<DbId>,
) -> AppResult<()> {
    ensure_field_exists(pool, field_id).await?;
    if let Some(section_id) = section_id {
        let section = SectionRepo::find_by_id(pool, section_id)
            .await?
            .ok_or_else(|| not_found("FieldSection", section_id))?;
        if section.field_id != field_id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Section {section_id} does not belong to field {field_id}"
            ))));
        }
    }
    Ok(())
}
