use axum::http::StatusCode;
use parkslot_core::models::user::DashboardStats;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{bearer, TestContext};

#[tokio::test]
async fn test_dashboard_stats_counts_slots_and_pending_requests() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, token) = ctx.user().await;
    let a1 = ctx.slot("A1").await;
    let a2 = ctx.slot("A2").await;
    ctx.slot("A3").await;

    let (name, value) = bearer(&token);
    let mut request_ids = Vec::new();
    for slot_id in [a1.id, a2.id] {
        let body: Value = ctx
            .server
            .post("/api/v1/slot-requests/request")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "slotId": slot_id }))
            .await
            .json();
        request_ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (name, value) = bearer(&admin_token);
    ctx.server
        .patch(&format!("/api/v1/slot-requests/{}/approve", request_ids[0]))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();

    let response = ctx
        .server
        .get("/api/v1/admin/stats")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<DashboardStats>(),
        DashboardStats {
            total_slots: 3,
            occupied: 1,
            available: 2,
            pending_requests: 1,
        }
    );
}

#[tokio::test]
async fn test_all_users_lists_accounts_without_password_hash() {
    let ctx = TestContext::new();
    let (admin, admin_token) = ctx.admin().await;
    let (user, _) = ctx.user().await;

    let (name, value) = bearer(&admin_token);
    let response = ctx
        .server
        .get("/api/v1/admin/all-users")
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let users: Value = response.json();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    // newest first
    assert_eq!(users[0]["id"], user.id.to_string());
    assert_eq!(users[1]["id"], admin.id.to_string());
    assert_eq!(users[1]["role"], "ADMIN");
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user().await;

    for path in ["/api/v1/admin/all-users", "/api/v1/admin/stats"] {
        let (name, value) = bearer(&token);
        let response = ctx.server.get(path).add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
