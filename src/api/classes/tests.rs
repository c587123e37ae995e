use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support::{self, TestContext};

async fn send(
    ctx: &TestContext,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(token), body))
        .await
        .expect("response");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

#[tokio::test]
async fn class_enrollment_round_trip() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let admin = test_support::insert_admin(ctx.db()).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let s1 = test_support::insert_student(ctx.db(), "FIRSTSTUDENT").await;
    let s2 = test_support::insert_student(ctx.db(), "SECONDSTUDENT").await;

    let (status, class) =
        send(&ctx, Method::POST, "/api/v1/classes", &token, Some(json!({ "name": "5A" }))).await;
    assert_eq!(status, StatusCode::CREATED, "response: {class}");
    let class_id = class["id"].as_str().expect("class id").to_string();

    let (status, body) =
        send(&ctx, Method::POST, "/api/v1/classes", &token, Some(json!({ "name": "5A" }))).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
    assert_eq!(body["code"], "CLASS_ALREADY_EXISTS");

    let (status, body) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/classes/{class_id}/students"),
        &token,
        Some(json!({ "student_ids": [s1.id, s2.id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["changed"].as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/classes/{class_id}/students/remove"),
        &token,
        Some(json!({ "student_ids": [s2.id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["changed"], json!([s2.id]));

    let (status, detail) =
        send(&ctx, Method::GET, &format!("/api/v1/classes/{class_id}"), &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {detail}");
    assert_eq!(detail["student_ids"], json!([s1.id]));

    let (status, history) = send(
        &ctx,
        Method::GET,
        &format!("/api/v1/students/{}/enrollments", s2.id),
        &token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {history}");
    assert_eq!(history[0]["class_id"], class_id);
    assert_eq!(history[0]["is_active"], false);
    assert!(history[1]["class_id"].is_null());
    assert_eq!(history[1]["reason"], "transfer");

    let (status, page) = send(&ctx, Method::GET, "/api/v1/classes", &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {page}");
    assert_eq!(page["total_count"], 1);
}

#[tokio::test]
async fn single_student_move_and_conflict() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let admin = test_support::insert_admin(ctx.db()).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let student = test_support::insert_student(ctx.db(), "WANDERER").await;
    let class = test_support::insert_class(ctx.db(), "6A").await;
    let uri = format!("/api/v1/students/{}/enrollment", student.id);

    let payload = json!({ "class_id": class.id, "reason": "admission" });
    let (status, record) = send(&ctx, Method::POST, &uri, &token, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK, "response: {record}");
    assert_eq!(record["is_active"], true);
    assert_eq!(record["reason"], "admission");

    let (status, body) = send(&ctx, Method::POST, &uri, &token, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
    assert_eq!(body["code"], "STUDENT_ALREADY_IN_CLASS");

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/students/missing/enrollment",
        &token,
        Some(json!({ "class_id": null, "reason": "transfer" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["code"], "STUDENT_NOT_FOUND");
}

#[tokio::test]
async fn promotions_are_recorded_per_class() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let admin = test_support::insert_admin(ctx.db()).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let from = test_support::insert_class(ctx.db(), "4B").await;
    let to = test_support::insert_class(ctx.db(), "5B").await;
    let uri = format!("/api/v1/classes/{}/promotions", from.id);

    let (status, record) = send(
        &ctx,
        Method::POST,
        &uri,
        &token,
        Some(json!({ "to_class_id": to.id, "promotion_date": "2025-06-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {record}");
    assert_eq!(record["promotion_date"], "2025-06-01");

    let (status, listed) = send(&ctx, Method::GET, &uri, &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {listed}");
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["to_class_id"], to.id);
}
