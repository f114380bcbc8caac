//! HTTP-level integration tests for alerts.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, build_test_app, create_user_with_token, get_auth, post_json_auth};
use farmops_core::roles::ROLE_TECHNICIAN;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn raise(pool: &PgPool, token: &str, body: Value) -> Value {
    let response = post_json_auth(build_test_app(pool.clone()), "/api/alert/create", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn alert(title: &str, level: i32) -> Value {
    json!({"title": title, "content": "Soil moisture below threshold", "level": level, "type": "sensor"})
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_alert_is_pending(pool: PgPool) {
    let token = admin_token(&pool).await;
    let created = raise(&pool, &token, alert("Dry soil", 1)).await;
    assert_eq!(created["status"], 0);
    assert_eq!(created["level"], 1);
    assert_eq!(created["type"], "sensor");
    assert!(created["handleTime"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_level_is_rejected(pool: PgPool) {
    let token = admin_token(&pool).await;
    let response = post_json_auth(build_test_app(pool), "/api/alert/create", alert("Bad", 5), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_equipment_reference_is_404(pool: PgPool) {
    let token = admin_token(&pool).await;
    let mut body = alert("Offline", 2);
    body["equipmentId"] = json!(31337);
    let response = post_json_auth(build_test_app(pool), "/api/alert/create", body, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn process_and_ignore_stamp_handle_time(pool: PgPool) {
    let token = admin_token(&pool).await;
    let first = raise(&pool, &token, alert("One", 0)).await["id"].as_i64().unwrap();
    let second = raise(&pool, &token, alert("Two", 0)).await["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/alert/process",
        json!({"id": first}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], 1);
    assert!(data["handleTime"].is_string());

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/alert/ignore",
        json!({"id": second}),
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["status"], 2);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/alert/process",
        json!({"id": 999999}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assign_sets_assignee_name(pool: PgPool) {
    let token = admin_token(&pool).await;
    let (tech_id, _) = create_user_with_token(&pool, "tech1", &[ROLE_TECHNICIAN]).await;
    let id = raise(&pool, &token, alert("Pump stalled", 2)).await["id"].as_i64().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/alert/assign",
        json!({"id": id, "assigneeId": tech_id}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["assigneeId"], tech_id);
    assert_eq!(data["assigneeName"], "tech1 (test)");

    let response = post_json_auth(
        build_test_app(pool),
        "/api/alert/assign",
        json!({"id": id, "assigneeId": 999999}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_keyword_and_level(pool: PgPool) {
    let token = admin_token(&pool).await;
    raise(&pool, &token, alert("Dry soil in plot 3", 1)).await;
    raise(&pool, &token, alert("Camera offline", 2)).await;
    raise(&pool, &token, alert("Dry soil in plot 7", 0)).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/alert/list",
        json!({"keyword": "dry soil", "page": 1, "pageSize": 10}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["total"], 2);

    let response = post_json_auth(
        build_test_app(pool),
        "/api/alert/list",
        json!({"level": "2", "status": -1}),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["title"], "Camera offline");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn statistics_count_by_status_and_level(pool: PgPool) {
    let token = admin_token(&pool).await;
    let id = raise(&pool, &token, alert("One", 0)).await["id"].as_i64().unwrap();
    raise(&pool, &token, alert("Two", 2)).await;
    raise(&pool, &token, alert("Three", 2)).await;
    post_json_auth(
        build_test_app(pool.clone()),
        "/api/alert/process",
        json!({"id": id}),
        &token,
    )
    .await;

    let response = get_auth(build_test_app(pool), "/api/alert/statistics", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["totalCount"], 3);
    assert_eq!(data["statusCounts"]["0"], 2);
    assert_eq!(data["statusCounts"]["1"], 1);
    assert_eq!(data["statusCounts"]["2"], 0);
    assert_eq!(data["levelCounts"]["2"], 2);
    assert_eq!(data["levelCounts"]["1"], 0);
    assert_eq!(data["weekCount"], 3);
    assert_eq!(data["monthCount"], 3);
}
