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
async fn overlapping_year_returns_conflict() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let admin = test_support::insert_admin(ctx.db()).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let (status, year) = send(
        &ctx,
        Method::POST,
        "/api/v1/academic-years",
        &token,
        Some(json!({
            "name": "2025/2026",
            "start_date": "2025-09-01",
            "end_date": "2026-05-31",
            "is_current": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {year}");
    assert_eq!(year["start_date"], "2025-09-01");

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/academic-years",
        &token,
        Some(json!({
            "name": "2025/2026-B",
            "start_date": "2026-01-01",
            "end_date": "2026-02-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["detail"].as_str().unwrap_or("").contains("2025/2026"));

    let (status, current) =
        send(&ctx, Method::GET, "/api/v1/academic-years/current", &token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {current}");
    assert_eq!(current["id"], year["id"]);
}

#[tokio::test]
async fn malformed_dates_are_bad_requests() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let admin = test_support::insert_admin(ctx.db()).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/academic-years",
        &token,
        Some(json!({
            "name": "Backwards",
            "start_date": "2026-05-31",
            "end_date": "2025-09-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn periods_and_weeks_are_created_under_their_parent() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let admin = test_support::insert_admin(ctx.db()).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let student = test_support::insert_student(ctx.db(), "CALENDARREADER").await;
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let (status, body) =
        send(&ctx, Method::GET, "/api/v1/academic-years/current", &student_token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["code"], "NO_CURRENT_ACADEMIC_YEAR_FOUND");

    let (_, year) = send(
        &ctx,
        Method::POST,
        "/api/v1/academic-years",
        &token,
        Some(json!({ "name": "2025/2026", "start_date": "2025-09-01", "end_date": "2026-05-31" })),
    )
    .await;
    let year_id = year["id"].as_str().expect("year id").to_string();

    let (status, period) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/academic-years/{year_id}/periods"),
        &token,
        Some(json!({
            "name": "Term 1",
            "order_num": 1,
            "start_date": "2025-09-01",
            "end_date": "2025-12-28"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {period}");
    let period_id = period["id"].as_str().expect("period id").to_string();

    let (status, week) = send(
        &ctx,
        Method::POST,
        &format!("/api/v1/academic-periods/{period_id}/weeks"),
        &token,
        Some(json!({
            "week_num": 1,
            "name": "Week 1",
            "start_date": "2025-09-01",
            "end_date": "2025-09-07"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {week}");
    assert_eq!(week["period_id"], period_id);

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/academic-years",
        &student_token,
        Some(json!({ "name": "Nope", "start_date": "2030-09-01", "end_date": "2031-05-31" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "response: {body}");

    let (status, years) =
        send(&ctx, Method::GET, "/api/v1/academic-years", &student_token, None).await;
    assert_eq!(status, StatusCode::OK, "response: {years}");
    assert_eq!(years[0]["periods"][0]["name"], "Term 1");
}
