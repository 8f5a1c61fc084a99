/// Session resolution and identity projection through the HTTP surface

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::TestContext;
use fitcoach_shared::store::UserStore;
use futures::future::join_all;
use serde_json::json;

const SESSION_ROUTES: &[(&str, &str)] = &[
    ("GET", "/api/user/role"),
    ("POST", "/api/user/onboarding"),
    ("GET", "/api/conversations"),
    ("GET", "/api/conversations/5b0f1e0e-3c1f-4b7e-9a57-1d1c2f6f9d01"),
    ("DELETE", "/api/conversations/5b0f1e0e-3c1f-4b7e-9a57-1d1c2f6f9d01"),
    ("POST", "/api/chat"),
    ("GET", "/api/programs"),
    ("GET", "/api/programs/purchases"),
    ("GET", "/api/admin/check-status"),
    ("GET", "/api/admin/users"),
];

#[tokio::test]
async fn test_session_routes_reject_missing_credentials_without_side_effects() {
    let ctx = TestContext::new();

    for (method, uri) in SESSION_ROUTES {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        let body = (method == Method::POST).then(|| json!({"message": "hi"}));

        let (status, body) = ctx.send(method, uri, None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body, json!({"error": "Unauthorized"}));
    }

    assert_eq!(ctx.store.user_count().await, 0);
    assert_eq!(ctx.store.chat_count().await, 0);
    assert_eq!(ctx.llm.call_count(), 0);
    assert_eq!(ctx.auth.lookup_count(), 0, "No credentials means no provider call");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, _) = ctx.get("/api/user/role", Some("expired-token")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.auth.lookup_count(), 1);
    assert_eq!(ctx.store.user_count().await, 0);
}

#[tokio::test]
async fn test_provider_failure_is_internal_error() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in();
    ctx.auth.set_unavailable(true);

    let (status, body) = ctx.get("/api/user/role", Some(&token)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An internal error occurred");
    assert_eq!(ctx.store.user_count().await, 0);
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in();

    let request = Request::builder()
        .uri("/api/user/role")
        .header(header::COOKIE, format!("theme=dark; sb-access-token={}", token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.call(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_lookup_projects_unknown_user() {
    let ctx = TestContext::new();
    let (token, identity) = ctx.sign_in();

    let (status, body) = ctx.get("/api/user/role", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "role": "user", "error": null}));

    let user = ctx.store.find_user(identity.id).await.unwrap().unwrap();
    assert!(!user.onboarding_completed);
    assert_eq!(user.email, identity.email);

    ctx.get("/api/user/role", Some(&token)).await;
    assert_eq!(ctx.store.user_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_create_one_row() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in();

    let responses = join_all((0..16).map(|_| ctx.get("/api/user/role", Some(&token)))).await;

    assert!(responses.iter().all(|(status, _)| *status == StatusCode::OK));
    assert_eq!(ctx.store.user_count().await, 1);
}

#[tokio::test]
async fn test_onboarding_completion() {
    let ctx = TestContext::new();
    let (token, identity) = ctx.sign_in();

    let (status, body) = ctx.send(Method::POST, "/api/user/onboarding", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["id"], identity.id.to_string());
    assert_eq!(body["user"]["onboardingCompleted"], true);

    let (_, role) = ctx.get("/api/user/role", Some(&token)).await;
    assert_eq!(role["role"], "user");
    assert!(ctx.store.find_user(identity.id).await.unwrap().unwrap().onboarding_completed);
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");

    let response = ctx
        .call(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
