//! Authentication, authorization and audit middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `super_admin` role.
//! - [`operation_log::record_operation`] -- Writes one audit row per `/api` request.

pub mod auth;
pub mod operation_log;
pub mod rbac;
