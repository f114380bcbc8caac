//! HTTP-level integration tests for farming activities.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{
    admin_token, body_json, body_text, build_test_app, delete_auth, get_auth, post_json_auth,
    put_json_auth,
};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Create a field with one section, returning `(field_id, section_id)`.
async fn seed_field(pool: &PgPool, token: &str, name: &str) -> (i64, i64) {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/field/create",
        json!({"name": name, "address": "East road", "manager": "Zhao", "area": 12}),
        token,
    )
    .await;
    let field_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/field/section/create",
        json!({"fieldId": field_id, "name": format!("{name}-A"), "area": 4}),
        token,
    )
    .await;
    let section_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    (field_id, section_id)
}

fn activity_body(field_id: i64, section_id: Option<i64>, kind: i32, start: &str) -> Value {
    json!({
        "fieldId": field_id,
        "sectionId": section_id,
        "title": "Spring fertilizing",
        "activityType": kind,
        "startTime": start,
        "endTime": null,
        "status": 0,
        "executor": "Liu",
        "materials": ["urea", "potash"],
    })
}

async fn create_activity(pool: &PgPool, token: &str, body: Value) -> Value {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/activity/create", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_resolves_field_and_section_names(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, section_id) = seed_field(&pool, &token, "Orchard").await;

    let created = create_activity(
        &pool,
        &token,
        activity_body(field_id, Some(section_id), 1, "2024-03-01 08:00:00"),
    )
    .await;
    assert_eq!(created["fieldName"], "Orchard");
    assert_eq!(created["sectionName"], "Orchard-A");
    assert_eq!(created["dataSource"], 0);
    assert_eq!(created["materials"], json!(["urea", "potash"]));
    assert_eq!(created["images"], json!([]));

    let id = created["id"].as_i64().unwrap();
    let response = get_auth(build_test_app(pool), &format!("/api/activity/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Spring fertilizing");
    assert_eq!(json["data"]["startTime"], "2024-03-01T08:00:00Z");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn section_from_another_field_is_rejected(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_a, _) = seed_field(&pool, &token, "Orchard").await;
    let (_, section_b) = seed_field(&pool, &token, "Paddy").await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/activity/create",
        activity_body(field_a, Some(section_b), 1, "2024-03-01"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_field_is_404(pool: PgPool) {
    let token = admin_token(&pool).await;
    let response = post_json_auth(
        build_test_app(pool),
        "/api/activity/create",
        activity_body(987654, None, 1, "2024-03-01"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_type_and_sorts(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-01")).await;
    create_activity(&pool, &token, activity_body(field_id, None, 2, "2024-04-01")).await;
    create_activity(&pool, &token, activity_body(field_id, None, 2, "2024-05-01")).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/activity/list?activityType=2&sortBy=startTime&sortOrder=asc",
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items[0]["startTime"], "2024-04-01T00:00:00Z");
    assert_eq!(items[1]["startTime"], "2024-05-01T00:00:00Z");

    let response = get_auth(
        build_test_app(pool),
        "/api/activity/list?activityType=-1&startDate=2024-04-01&endDate=2024-04-30",
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_checks_merged_times(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    let id = create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-10"))
        .await["id"]
        .as_i64()
        .unwrap();

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/activity/{id}"),
        json!({"endTime": "2024-03-01"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        build_test_app(pool),
        &format!("/api/activity/{id}"),
        json!({"endTime": "2024-03-12 18:00:00", "status": 2}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], 2);
    assert_eq!(json["data"]["endTime"], "2024-03-12T18:00:00Z");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn statistics_are_zero_filled(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-01")).await;
    create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-15")).await;
    create_activity(&pool, &token, activity_body(field_id, None, 5, "2024-09-20")).await;

    let response = get_auth(
        build_test_app(pool),
        &format!("/api/activity/statistics?fieldId={field_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["totalCount"], 3);
    assert_eq!(data["byType"]["1"], 2);
    assert_eq!(data["byType"]["5"], 1);
    assert_eq!(data["byType"]["0"], 0);
    assert_eq!(data["byType"]["99"], 0);
    assert_eq!(data["byStatus"]["0"], 3);
    assert_eq!(data["byStatus"]["3"], 0);
    assert_eq!(data["byMonth"]["03"], 2);
    assert_eq!(data["byMonth"]["09"], 1);
    assert_eq!(data["byMonth"]["12"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn export_defaults_to_csv_attachment(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-01")).await;

    let response = get_auth(build_test_app(pool), "/api/activity/export", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CONTENT_TYPE].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"activities-"));

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("ID,Title,Type,Status,Field"));
    let row = lines.next().unwrap();
    assert!(row.contains("Spring fertilizing,Fertilizing,Planned,Orchard"));
    assert!(row.contains("\"urea, potash\""));
    assert!(lines.next().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn export_json_returns_envelope(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-01")).await;

    let response = get_auth(build_test_app(pool), "/api/activity/export?format=json", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_activity(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    let id = create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-01"))
        .await["id"]
        .as_i64()
        .unwrap();

    let response = delete_auth(build_test_app(pool.clone()), &format!("/api/activity/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(build_test_app(pool), &format!("/api/activity/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_field_cascades_to_activities(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (field_id, _) = seed_field(&pool, &token, "Orchard").await;
    let id = create_activity(&pool, &token, activity_body(field_id, None, 1, "2024-03-01"))
        .await["id"]
        .as_i64()
        .unwrap();

    delete_auth(build_test_app(pool.clone()), &format!("/api/field/delete/{field_id}"), &token).await;

    let response = get_auth(build_test_app(pool), &format!("/api/activity/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
