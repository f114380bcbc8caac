pub mod activity;
pub mod alert;
pub mod equipment;
pub mod field;
pub mod operation_log;
pub mod role;
pub mod section;
pub mod user;
