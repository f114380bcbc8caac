use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reject `code` unless it appears in `allowed`.
///
/// `what` names the attribute in the error message, e.g. `"activity type"`.
pub fn ensure_known_code(what: &str, code: i32, allowed: &[i32]) -> Result<(), CoreError> {
    if allowed.contains(&code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Unknown {what} code: {code}")))
    }
}
