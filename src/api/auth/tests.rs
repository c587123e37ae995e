use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn login_accepts_username_or_email() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let email = "teacher@school.test";
    test_support::insert_account(ctx.db(), email, "IVANOVIVAN123", UserRole::Teacher).await;

    for login in ["IVANOVIVAN123", "Teacher@School.test"] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "login": login, "password": test_support::TEST_PASSWORD })),
            ))
            .await
            .expect("login");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["user"]["username"], "IVANOVIVAN123");

        let token = body["access_token"].as_str().expect("token").to_string();
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&token), None))
            .await
            .expect("me");
        let status = response.status();
        let me = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {me}");
        assert_eq!(me["email"], "teacher@school.test");
    }
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    test_support::insert_student(ctx.db(), "PETROVPETR100").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "PETROVPETR100", "password": "not-the-password" })),
        ))
        .await
        .expect("login");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "response: {body}");
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let Some(ctx) = test_support::setup_test_context().await else { return };

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/auth/me",
            Some("not-a-jwt"),
            None,
        ))
        .await
        .expect("me");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
