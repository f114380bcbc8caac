//! Domain building blocks shared by the repository and HTTP layers.
//!
//! Nothing in this crate performs IO: it holds the id/time aliases, the
//! domain error type, the enumerated code tables for activities, equipment
//! and alerts, pagination and query-string helpers, statistics bucketing,
//! the navigation menu table, and the request classifier used by the
//! operation log.

pub mod activity;
pub mod alert;
pub mod equipment;
pub mod error;
pub mod menu;
pub mod operation_log;
pub mod query;
pub mod roles;
pub mod statistics;
pub mod types;
