pub mod activity_repo;
pub mod alert_repo;
pub mod equipment_repo;
pub mod field_repo;
pub mod operation_log_repo;
pub mod role_repo;
pub mod section_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepo;
pub use alert_repo::AlertRepo;
pub use equipment_repo::EquipmentRepo;
pub use field_repo::FieldRepo;
pub use operation_log_repo::OperationLogRepo;
pub use role_repo::RoleRepo;
pub use section_repo::SectionRepo;
pub use user_repo::UserRepo;
