//! Activity type, status and data-source codes.

/// Kinds of farming operation.
pub mod activity_type {
    pub const PLANTING: i32 = 0;
    pub const FERTILIZING: i32 = 1;
    pub const IRRIGATION: i32 = 2;
    pub const WEEDING: i32 = 3;
    pub const PEST_CONTROL: i32 = 4;
    pub const HARVEST: i32 = 5;
    pub const OTHER: i32 = 99;

    pub const ALL: &[i32] = &[
        PLANTING,
        FERTILIZING,
        IRRIGATION,
        WEEDING,
        PEST_CONTROL,
        HARVEST,
        OTHER,
    ];

    pub fn label(code: i32) -> &'static str {
        match code {
            PLANTING => "Planting",
            FERTILIZING => "Fertilizing",
            IRRIGATION => "Irrigation",
            WEEDING => "Weeding",
            PEST_CONTROL => "Pest control",
            HARVEST => "Harvest",
            _ => "Other",
        }
    }
}

/// Lifecycle of an activity.
pub mod activity_status {
    pub const PLANNED: i32 = 0;
    pub const IN_PROGRESS: i32 = 1;
    pub const COMPLETED: i32 = 2;
    pub const CANCELLED: i32 = 3;

    pub const ALL: &[i32] = &[PLANNED, IN_PROGRESS, COMPLETED, CANCELLED];

    pub fn label(code: i32) -> &'static str {
        match code {
            PLANNED => "Planned",
            IN_PROGRESS => "In progress",
            COMPLETED => "Completed",
            CANCELLED => "Cancelled",
            _ => "Unknown",
        }
    }
}

/// Where an activity record came from.
pub mod data_source {
    pub const MANUAL: i32 = 0;
    pub const DEVICE: i32 = 1;
    pub const SYSTEM: i32 = 2;

    pub const ALL: &[i32] = &[MANUAL, DEVICE, SYSTEM];
}

/// Columns `GET /activity/list` may sort by, keyed by their JSON name.
///
/// Returns the SQL column for a recognised key, `None` otherwise.
pub fn sort_column(key: &str) -> Option<&'static str> {
    match key {
        "createTime" => Some("created_at"),
        "updateTime" => Some("updated_at"),
        "startTime" => Some("start_time"),
        "endTime" => Some("end_time"),
        "title" => Some("title"),
        "status" => Some("status"),
        "activityType" => Some("activity_type"),
        _ => None,
    }
}
