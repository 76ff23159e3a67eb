// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driving the axum router in-process.

use std::time::Duration;

use axum::body::Body;
use axum::Router;
use casebook_gateway::{router, GatewayState, SessionStore};
use casebook_test_utils::{TestHarness, TEST_PASSWORD};
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(harness: &TestHarness) -> Router {
    router(GatewayState::new(
        harness.desk.clone(),
        SessionStore::new(Duration::from_secs(600)),
    ))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn login(app: &Router, user_name: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({"user_name": user_name, "password": TEST_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

fn new_case() -> Value {
    json!({
        "case": {
            "title": "Parcel missing",
            "customer_first_name": "Jane",
            "customer_last_name": "Doe",
            "customer_email": "jane@example.com",
            "category": "Shipping"
        },
        "message": {"text": "It never arrived"}
    })
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new().await.unwrap();
    let (status, body) = call(&app(&harness), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn customer_flow_over_http() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (status, created) = call(&app, Method::POST, "/v1/cases", None, Some(new_case())).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let token = created["chat_token"].as_str().unwrap().to_string();
    assert!(created["case_id"].is_i64());

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/v1/chat/case/{token}/messages"),
        None,
        Some(json!({"text": "Any news?"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, view) = call(
        &app,
        Method::GET,
        &format!("/v1/chat/case/{token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["caseDetails"]["category"], "Shipping");
    assert_eq!(view["caseDetails"]["status"], "Unopened");
    assert_eq!(view["messages"].as_array().unwrap().len(), 2);
    assert_eq!(view["poll_interval_ms"], 3000);
    assert!(view["handler"].is_null());
}

#[tokio::test]
async fn bad_tokens_are_404_with_same_body() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (s1, b1) = call(
        &app,
        Method::GET,
        "/v1/chat/case/6f1c2f9e-5f7a-4d0b-9a57-1b3f8f1d2c3e",
        None,
        None,
    )
    .await;
    let (s2, b2) = call(&app, Method::GET, "/v1/chat/case/garbage", None, None).await;
    assert_eq!(s1, StatusCode::NOT_FOUND);
    assert_eq!(s2, StatusCode::NOT_FOUND);
    assert_eq!(b1, b2);
}

#[tokio::test]
async fn invalid_case_is_400() {
    let harness = TestHarness::new().await.unwrap();
    let (status, body) = call(
        &app(&harness),
        Method::POST,
        "/v1/cases",
        None,
        Some(json!({"case": {"title": "Help"}, "message": {"text": "hi"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn backoffice_requires_session() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (status, _) = call(&app, Method::GET, "/v1/cases", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::GET, "/v1/cases", Some("made-up"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_401() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_agent("sam").await.unwrap();
    let (status, _) = call(
        &app(&harness),
        Method::POST,
        "/v1/login",
        None,
        Some(json!({"user_name": "sam", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_whoami_logout() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_agent("sam").await.unwrap();
    let app = app(&harness);
    let token = login(&app, "sam").await;

    let (status, me) = call(&app, Method::GET, "/v1/login", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user_name"], "sam");
    assert_eq!(me["role"], "customer_support");

    let (status, _) = call(&app, Method::DELETE, "/v1/login", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, "/v1/login", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn agent_works_a_case() {
    let harness = TestHarness::new().await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let app = app(&harness);
    let token = login(&app, "sam").await;

    let (_, created) = call(&app, Method::POST, "/v1/cases", None, Some(new_case())).await;
    let id = created["case_id"].as_i64().unwrap();

    let (status, cases) = call(&app, Method::GET, "/v1/cases", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cases.as_array().unwrap().len(), 1);

    let (status, case) = call(
        &app,
        Method::PATCH,
        &format!("/v1/chat/backoffice/{id}/assign"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{case}");
    assert_eq!(case["status"], "Open");
    assert_eq!(case["handler"], sam.user_id.0);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/v1/chat/backoffice/{id}/messages"),
        Some(&token),
        Some(json!({"text": "Looking into it"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, view) = call(
        &app,
        Method::GET,
        &format!("/v1/chat/backoffice/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["handler"]["user_name"], "sam");
    assert_eq!(view["messages"][1]["is_sender_customer"], false);

    let (status, mine) = call(
        &app,
        Method::GET,
        &format!("/v1/users/{}/cases", sam.user_id.0),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    for _ in 0..2 {
        let (status, case) = call(
            &app,
            Method::PATCH,
            &format!("/v1/chat/backoffice/{id}/close"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(case["status"], "Closed");
    }

    let (status, _) = call(
        &app,
        Method::PATCH,
        &format!("/v1/chat/backoffice/{id}/open"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn agent_cannot_administer_users() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_agent("sam").await.unwrap();
    let app = app(&harness);
    let token = login(&app, "sam").await;

    let (status, _) = call(&app, Method::GET, "/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/users",
        Some(&token),
        Some(json!({"user_name": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invite_and_register_over_http() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_admin("root").await.unwrap();
    let app = app(&harness);
    let admin = login(&app, "root").await;

    let (status, invited) = call(
        &app,
        Method::POST,
        "/v1/users",
        Some(&admin),
        Some(json!({
            "user_name": "alice",
            "email": "a@x.com",
            "role": "customer_support",
            "active": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{invited}");
    assert_eq!(invited["user"]["status"], "pending");
    assert!(invited["user"].get("password_hash").is_none());
    let register_token = invited["register_token"].as_str().unwrap().to_string();

    let (status, pending) = call(
        &app,
        Method::GET,
        &format!("/v1/register/{register_token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["user_name"], "alice");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/v1/register/{register_token}"),
        None,
        Some(json!({"password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/v1/register/{register_token}"),
        None,
        Some(json!({"password": "secret2"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/register",
        None,
        Some(json!({"user_name": "alice", "password": "secret2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        Method::POST,
        "/v1/login",
        None,
        Some(json!({"user_name": "alice", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_updates_and_deletes_users() {
    let harness = TestHarness::new().await.unwrap();
    let root = harness.seed_admin("root").await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let app = app(&harness);
    let admin = login(&app, "root").await;

    let (status, users) = call(&app, Method::GET, "/v1/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, updated) = call(
        &app,
        Method::PATCH,
        &format!("/v1/users/{}", sam.user_id.0),
        Some(&admin),
        Some(json!({"active": false, "role": "not-a-role"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["active"], false);
    assert_eq!(updated["role"], "customer_support");

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/v1/users/{}", root.user_id.0),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/v1/users/{}", sam.user_id.0),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/v1/users/{}", sam.user_id.0),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_404_json() {
    let harness = TestHarness::new().await.unwrap();
    let (status, body) = call(&app(&harness), Method::GET, "/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn bogus_enums_fall_back_over_http() {
    let harness = TestHarness::new().await.unwrap();
    let app = app(&harness);

    let (status, created) = call(
        &app,
        Method::POST,
        "/v1/cases",
        None,
        Some(json!({
            "case": {
                "status": "bogus",
                "category": "bogus",
                "title": "Help",
                "customer_email": "c@x.com"
            },
            "message": {"text": "hi"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");

    let token = created["chat_token"].as_str().unwrap();
    let (status, view) = call(&app, Method::GET, &format!("/v1/chat/case/{token}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["caseDetails"]["status"], "Unopened");
    assert_eq!(view["caseDetails"]["category"], "Other");
    assert_eq!(view["messages"][0]["text"], "hi");
}

#[tokio::test]
async fn malformed_json_body_is_400_json() {
    let harness = TestHarness::new().await.unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/cases")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"case\": "))
        .unwrap();

    let response = app(&harness).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid request body"));
}

#[tokio::test]
async fn non_numeric_case_id_is_400_json() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_agent("bob").await.unwrap();
    let app = app(&harness);
    let token = login(&app, "bob").await;

    let (status, body) = call(
        &app,
        Method::GET,
        "/v1/chat/backoffice/abc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid path"));
}
