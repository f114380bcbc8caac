//! Alert level and status codes.

pub mod alert_level {
    pub const NORMAL: i32 = 0;
    pub const IMPORTANT: i32 = 1;
    pub const URGENT: i32 = 2;

    pub const ALL: &[i32] = &[NORMAL, IMPORTANT, URGENT];
}

pub mod alert_status {
    pub const PENDING: i32 = 0;
    pub const PROCESSED: i32 = 1;
    pub const IGNORED: i32 = 2;

    pub const ALL: &[i32] = &[PENDING, PROCESSED, IGNORED];
}

/// Rolling windows reported by alert statistics, in days.
pub const WEEK_WINDOW_DAYS: i64 = 7;
pub const MONTH_WINDOW_DAYS: i64 = 30;
