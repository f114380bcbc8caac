//! Integration tests for field, section, activity, equipment and alert CRUD.
//!
//! Exercises the repository layer against a real database:
//! - Create / fetch / update / delete round trips
//! - Cascade and SET NULL behaviour
//! - Unique and foreign key violations
//! - List filters and grouped counts

use chrono::{TimeZone, Utc};
use farmops_core::activity::{activity_status, activity_type};
use farmops_core::alert::{alert_level, alert_status};
use farmops_core::equipment::{equipment_status, equipment_type};
use farmops_core::query::PageRequest;
use farmops_db::models::activity::{ActivityQuery, CreateActivity, UpdateActivity};
use farmops_db::models::alert::{AlertQuery, CreateAlert};
use farmops_db::models::equipment::{CreateEquipment, EquipmentQuery, UpdateEquipment};
use farmops_db::models::field::{CreateField, FieldQuery, UpdateField};
use farmops_db::models::section::CreateFieldSection;
use farmops_db::repositories::{
    ActivityRepo, AlertRepo, EquipmentRepo, FieldRepo, SectionRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_field(name: &str, manager: &str) -> CreateField {
    CreateField {
        name: name.to_string(),
        address: "North road 1".to_string(),
        manager: manager.to_string(),
        area: 12.5,
        area_unit: None,
        status: None,
        remark: None,
    }
}

fn new_section(field_id: i64, name: &str) -> CreateFieldSection {
    CreateFieldSection {
        field_id,
        name: name.to_string(),
        area: 3.0,
        area_unit: None,
        crop_type: Some("rice".to_string()),
        status: None,
        remark: None,
    }
}

fn new_activity(field_id: i64, section_id: Option<i64>, kind: i32, month: u32) -> CreateActivity {
    CreateActivity {
        field_id,
        section_id,
        title: format!("activity {kind}"),
        activity_type: kind,
        description: None,
        start_time: Utc.with_ymd_and_hms(2024, month, 10, 8, 0, 0).unwrap(),
        end_time: None,
        status: activity_status::PLANNED,
        executor: Some("Zhang".to_string()),
        materials: None,
        data_source: None,
        weather_info: None,
        effect_description: None,
        images: None,
        remark: None,
    }
}

fn new_equipment(field_id: i64, serial: &str, battery: Option<i32>) -> CreateEquipment {
    CreateEquipment {
        name: format!("sensor {serial}"),
        equipment_type: equipment_type::SOIL_MOISTURE_SENSOR,
        model: "SM-100".to_string(),
        serial_number: serial.to_string(),
        field_id,
        section_id: None,
        status: equipment_status::ONLINE,
        location: None,
        battery_level: battery,
        ip_address: None,
        manufacturer: None,
        description: None,
        install_time: None,
        last_report_time: None,
        last_maintenance_time: None,
        next_maintenance_time: None,
        purchase_date: None,
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn is_fk_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

// ---------------------------------------------------------------------------
// Fields and sections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_defaults_and_round_trip(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    assert_eq!(field.area_unit, "亩");
    assert_eq!(field.status, 1);

    let fetched = FieldRepo::find_by_id(&pool, field.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "East plot");
    assert_eq!(fetched.area, 12.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_partial_update(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let update = UpdateField {
        id: field.id,
        name: None,
        address: None,
        manager: Some("Wang".to_string()),
        area: None,
        area_unit: None,
        status: Some(0),
        remark: None,
    };
    let updated = FieldRepo::update(&pool, &update).await.unwrap().unwrap();
    assert_eq!(updated.name, "East plot");
    assert_eq!(updated.manager, "Wang");
    assert_eq!(updated.status, 0);

    let missing = UpdateField { id: field.id + 1000, ..update };
    assert!(FieldRepo::update(&pool, &missing).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_list_filters_and_pages(pool: PgPool) {
    for i in 0..3 {
        FieldRepo::create(&pool, &new_field(&format!("North {i}"), "Li")).await.unwrap();
    }
    FieldRepo::create(&pool, &new_field("South", "Wang")).await.unwrap();

    let by_name = FieldQuery {
        name: Some("north".to_string()),
        ..Default::default()
    };
    assert_eq!(FieldRepo::count(&pool, &by_name).await.unwrap(), 3);

    let page = FieldRepo::list(&pool, &by_name, PageRequest::new(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);

    let by_manager = FieldQuery {
        manager: Some("wan".to_string()),
        ..Default::default()
    };
    let rows = FieldRepo::list(&pool, &by_manager, PageRequest::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "South");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_field_delete_cascades(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let section = SectionRepo::create(&pool, &new_section(field.id, "A1")).await.unwrap();
    let activity = ActivityRepo::create(
        &pool,
        &new_activity(field.id, Some(section.id), activity_type::PLANTING, 3),
    )
    .await
    .unwrap();
    let device = EquipmentRepo::create(&pool, &new_equipment(field.id, "SN-1", Some(80)))
        .await
        .unwrap();

    assert!(FieldRepo::delete(&pool, field.id).await.unwrap());
    assert!(SectionRepo::find_by_id(&pool, section.id).await.unwrap().is_none());
    assert!(ActivityRepo::find_by_id(&pool, activity.id).await.unwrap().is_none());
    assert!(EquipmentRepo::find_by_id(&pool, device.id).await.unwrap().is_none());
    assert!(!FieldRepo::delete(&pool, field.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sections_grouped_by_field(pool: PgPool) {
    let a = FieldRepo::create(&pool, &new_field("A", "Li")).await.unwrap();
    let b = FieldRepo::create(&pool, &new_field("B", "Li")).await.unwrap();
    SectionRepo::create(&pool, &new_section(a.id, "A1")).await.unwrap();
    SectionRepo::create(&pool, &new_section(a.id, "A2")).await.unwrap();
    SectionRepo::create(&pool, &new_section(b.id, "B1")).await.unwrap();

    assert_eq!(SectionRepo::list_by_field(&pool, a.id).await.unwrap().len(), 2);
    assert_eq!(SectionRepo::list_by_fields(&pool, &[a.id, b.id]).await.unwrap().len(), 3);
    assert!(SectionRepo::list_by_fields(&pool, &[]).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_section_requires_existing_field(pool: PgPool) {
    let err = SectionRepo::create(&pool, &new_section(9999, "orphan"))
        .await
        .unwrap_err();
    assert!(is_fk_violation(&err));
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activity_carries_joined_names(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let section = SectionRepo::create(&pool, &new_section(field.id, "A1")).await.unwrap();
    let activity = ActivityRepo::create(
        &pool,
        &new_activity(field.id, Some(section.id), activity_type::IRRIGATION, 5),
    )
    .await
    .unwrap();

    assert_eq!(activity.field_name.as_deref(), Some("East plot"));
    assert_eq!(activity.section_name.as_deref(), Some("A1"));
    assert!(activity.materials.is_empty());

    SectionRepo::delete(&pool, section.id).await.unwrap();
    let after = ActivityRepo::find_by_id(&pool, activity.id).await.unwrap().unwrap();
    assert_eq!(after.section_id, None);
    assert_eq!(after.section_name, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activity_update_applies_only_present_fields(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let activity = ActivityRepo::create(
        &pool,
        &new_activity(field.id, None, activity_type::WEEDING, 6),
    )
    .await
    .unwrap();

    let update = UpdateActivity {
        status: Some(activity_status::COMPLETED),
        materials: Some(vec!["urea".to_string()]),
        ..Default::default()
    };
    let updated = ActivityRepo::update(&pool, activity.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, activity_status::COMPLETED);
    assert_eq!(updated.title, activity.title);
    assert_eq!(updated.materials, vec!["urea".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activity_grouped_counts(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    for (kind, month) in [
        (activity_type::PLANTING, 3),
        (activity_type::PLANTING, 4),
        (activity_type::HARVEST, 9),
    ] {
        ActivityRepo::create(&pool, &new_activity(field.id, None, kind, month))
            .await
            .unwrap();
    }

    let params = ActivityQuery {
        field_id: Some(field.id),
        ..Default::default()
    };
    let by_type = ActivityRepo::count_by_type(&pool, &params).await.unwrap();
    assert_eq!(
        by_type,
        vec![(activity_type::PLANTING, 2), (activity_type::HARVEST, 1)]
    );
    let by_month = ActivityRepo::count_by_month(&pool, &params).await.unwrap();
    assert_eq!(by_month, vec![(3, 1), (4, 1), (9, 1)]);
    assert_eq!(ActivityRepo::count(&pool, &params).await.unwrap(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_activity_sorting_and_date_range(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    for month in [7, 2, 5] {
        ActivityRepo::create(
            &pool,
            &new_activity(field.id, None, activity_type::FERTILIZING, month),
        )
        .await
        .unwrap();
    }

    let ascending = ActivityQuery {
        sort_by: Some("startTime".to_string()),
        sort_order: Some("asc".to_string()),
        ..Default::default()
    };
    let rows = ActivityRepo::list(&pool, &ascending, PageRequest::default())
        .await
        .unwrap();
    let months: Vec<_> = rows.iter().map(|a| a.start_time.format("%m").to_string()).collect();
    assert_eq!(months, vec!["02", "05", "07"]);

    let ranged = ActivityQuery {
        start_date: Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
        end_date: Some(Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap()),
        ..Default::default()
    };
    assert_eq!(ActivityRepo::count(&pool, &ranged).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equipment_serial_number_is_unique(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let first = EquipmentRepo::create(&pool, &new_equipment(field.id, "SN-1", None))
        .await
        .unwrap();

    let err = EquipmentRepo::create(&pool, &new_equipment(field.id, "SN-1", None))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    assert!(EquipmentRepo::serial_number_taken(&pool, "SN-1", None).await.unwrap());
    assert!(!EquipmentRepo::serial_number_taken(&pool, "SN-1", Some(first.id))
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equipment_keyword_and_update(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let device = EquipmentRepo::create(&pool, &new_equipment(field.id, "ABC-42", Some(50)))
        .await
        .unwrap();
    EquipmentRepo::create(&pool, &new_equipment(field.id, "XYZ-7", Some(90)))
        .await
        .unwrap();

    let params = EquipmentQuery {
        keyword: Some("abc".to_string()),
        ..Default::default()
    };
    let rows = EquipmentRepo::list(&pool, &params, PageRequest::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field_name.as_deref(), Some("East plot"));

    let update = UpdateEquipment {
        id: device.id,
        name: None,
        equipment_type: None,
        model: None,
        serial_number: None,
        field_id: None,
        section_id: None,
        status: Some(equipment_status::FAULT),
        location: Some("corner".to_string()),
        battery_level: None,
        ip_address: None,
        manufacturer: None,
        description: None,
        install_time: None,
        last_report_time: None,
        last_maintenance_time: None,
        next_maintenance_time: None,
        purchase_date: None,
    };
    let updated = EquipmentRepo::update(&pool, &update).await.unwrap().unwrap();
    assert_eq!(updated.status, equipment_status::FAULT);
    assert_eq!(updated.location.as_deref(), Some("corner"));
    assert_eq!(updated.battery_level, Some(50));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_equipment_battery_buckets(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    for (serial, battery) in [("a", Some(5)), ("b", Some(20)), ("c", Some(60)), ("d", None)] {
        EquipmentRepo::create(&pool, &new_equipment(field.id, serial, battery))
            .await
            .unwrap();
    }

    let stats = EquipmentRepo::battery_stats(&pool, Some(field.id)).await.unwrap();
    assert_eq!((stats.low, stats.medium, stats.high, stats.no_data), (1, 1, 1, 1));
    assert_eq!(EquipmentRepo::count_online(&pool, None).await.unwrap(), 4);
    assert!(EquipmentRepo::count_by_status(&pool, Some(field.id + 1))
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_alert_lifecycle(pool: PgPool) {
    let field = FieldRepo::create(&pool, &new_field("East plot", "Li")).await.unwrap();
    let device = EquipmentRepo::create(&pool, &new_equipment(field.id, "SN-9", Some(10)))
        .await
        .unwrap();
    let alert = AlertRepo::create(
        &pool,
        &CreateAlert {
            title: "Low battery".to_string(),
            content: "Battery under 20%".to_string(),
            level: alert_level::IMPORTANT,
            alert_type: Some("battery".to_string()),
            source: None,
            field_id: Some(field.id),
            section_id: None,
            equipment_id: Some(device.id),
            assignee_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(alert.status, alert_status::PENDING);
    assert_eq!(alert.equipment_name.as_deref(), Some("sensor SN-9"));
    assert!(alert.handle_time.is_none());

    let by_device_name = AlertQuery {
        keyword: Some("sn-9".to_string()),
        ..Default::default()
    };
    assert_eq!(AlertRepo::count(&pool, &by_device_name).await.unwrap(), 1);

    let processed = AlertRepo::set_status(&pool, alert.id, alert_status::PROCESSED)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(processed.status, alert_status::PROCESSED);
    assert!(processed.handle_time.is_some());

    let counts = AlertRepo::window_counts(&pool).await.unwrap();
    assert_eq!((counts.today, counts.week, counts.month), (1, 1, 1));
    assert_eq!(
        AlertRepo::count_by_status(&pool, None, None).await.unwrap(),
        vec![(alert_status::PROCESSED, 1)]
    );

    assert!(AlertRepo::set_status(&pool, alert.id + 100, alert_status::IGNORED)
        .await
        .unwrap()
        .is_none());
}
