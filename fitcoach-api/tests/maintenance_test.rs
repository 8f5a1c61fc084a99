/// Maintenance status truth table

mod common;

use axum::http::StatusCode;
use common::{TestContext, TestOptions};
use fitcoach_shared::models::user::UserRole;
use serde_json::json;

fn maintenance_on() -> TestContext {
    TestContext::with_options(TestOptions {
        maintenance: true,
        ..Default::default()
    })
}

#[tokio::test]
async fn test_maintenance_off_skips_session_lookup() {
    let ctx = TestContext::new();
    let (token, _) = ctx.sign_in_as(UserRole::User, true).await;

    let (status, body) = ctx.get("/api/maintenance/status", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "maintenanceMode": false, "canAccess": true, "error": null})
    );
    assert_eq!(ctx.auth.lookup_count(), 0);
}

#[tokio::test]
async fn test_maintenance_on_without_session() {
    let ctx = maintenance_on();

    let (status, body) = ctx.get("/api/maintenance/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["maintenanceMode"], true);
    assert_eq!(body["canAccess"], false);
    assert_eq!(body["reason"], "maintenance_not_authenticated");
}

#[tokio::test]
async fn test_maintenance_on_blocks_users() {
    let ctx = maintenance_on();
    let (token, _) = ctx.sign_in_as(UserRole::User, true).await;

    let (status, body) = ctx.get("/api/maintenance/status", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canAccess"], false);
    assert_eq!(body["reason"], "maintenance_user_blocked");
}

#[tokio::test]
async fn test_maintenance_on_lets_admins_through() {
    let ctx = maintenance_on();
    let (token, _) = ctx.sign_in_as(UserRole::Admin, true).await;

    let (status, body) = ctx.get("/api/maintenance/status", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canAccess"], true);
    assert_eq!(body["reason"], "admin_bypass");
}

#[tokio::test]
async fn test_maintenance_on_projects_new_identity_as_blocked_user() {
    let ctx = maintenance_on();
    let (token, _) = ctx.sign_in();

    let (_, body) = ctx.get("/api/maintenance/status", Some(&token)).await;

    assert_eq!(body["reason"], "maintenance_user_blocked");
    assert_eq!(ctx.store.user_count().await, 1);
}

#[tokio::test]
async fn test_maintenance_on_with_provider_down() {
    let ctx = maintenance_on();
    let (token, _) = ctx.sign_in();
    ctx.auth.set_unavailable(true);

    let (status, _) = ctx.get("/api/maintenance/status", Some(&token)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
