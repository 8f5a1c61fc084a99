/// Admin endpoints

mod common;

use axum::http::StatusCode;
use common::TestContext;
use fitcoach_shared::models::user::UserRole;
use serde_json::json;

#[tokio::test]
async fn test_check_status_does_not_project() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in();

    let (status, body) = ctx.get("/api/admin/check-status", Some(&token)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "User not found"}));
    assert_eq!(ctx.store.user_count().await, 0);
}

#[tokio::test]
async fn test_check_status_reports_role() {
    let ctx = TestContext::new();
    let (admin_token, admin) = ctx.sign_in_as(UserRole::Admin, true).await;
    let (user_token, _) = ctx.sign_in_as(UserRole::User, false).await;

    let (status, body) = ctx.get("/api/admin/check-status", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], true);
    assert_eq!(body["user"]["id"], admin.id.to_string());
    assert_eq!(body["user"]["role"], "admin");

    let (status, body) = ctx.get("/api/admin/check-status", Some(&user_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], false);
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in_as(UserRole::User, true).await;

    let (status, body) = ctx.get("/api/admin/users", Some(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "Admin role required"}));
}

#[tokio::test]
async fn test_list_users_for_admin() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in_as(UserRole::Admin, true).await;
    ctx.sign_in_as(UserRole::User, true).await;
    ctx.sign_in_as(UserRole::User, false).await;

    let (status, body) = ctx.get("/api/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);

    let (status, body) = ctx.get("/api/admin/users?limit=2&offset=2", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 1);

    let (status, body) = ctx.get("/api/admin/users?limit=0", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "limit");
}
