//! Well-known role and permission names.
//!
//! These must match the seed data in `20260301000002_create_roles_and_users.sql`.

pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_FARM_ADMIN: &str = "farm_admin";
pub const ROLE_TECHNICIAN: &str = "technician";

/// Permission names granted through roles.
pub mod permissions {
    pub const SYSTEM: &str = "system";
    pub const USER: &str = "user";
    pub const ROLE: &str = "role";
    pub const MONITOR: &str = "monitor";
    pub const EQUIPMENT: &str = "equipment";
    pub const FARM: &str = "farm";
    pub const ALERT: &str = "alert";
    pub const ANALYSIS: &str = "analysis";
}

/// Account status codes stored in `users.status`.
pub mod user_status {
    pub const DISABLED: i32 = 0;
    pub const ENABLED: i32 = 1;

    pub const ALL: &[i32] = &[DISABLED, ENABLED];

    /// The status an account moves to when toggled.
    pub fn toggled(current: i32) -> i32 {
        if current == ENABLED {
            DISABLED
        } else {
            ENABLED
        }
    }
}

/// Minimum accepted password length for user accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Whether a role list grants full administrative access.
pub fn is_super_admin<S: AsRef<str>>(roles: &[S]) -> bool {
    roles.iter().any(|r| r.as_ref() == ROLE_SUPER_ADMIN)
}
