use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use parkslot_core::models::{
    slot_request::{RequestStatus, SlotRequest},
    user::{Role, User},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{bearer, token_for, TestContext, TEST_RATE};

async fn file_request(ctx: &TestContext, token: &str, slot_id: Uuid) -> SlotRequest {
    let (name, value) = bearer(token);
    let response = ctx
        .server
        .post("/api/v1/slot-requests/request")
        .add_header(name, value)
        .json(&json!({ "slotId": slot_id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn approve(ctx: &TestContext, admin_token: &str, request_id: Uuid) -> axum_test::TestResponse {
    let (name, value) = bearer(admin_token);
    ctx.server
        .patch(&format!("/api/v1/slot-requests/{}/approve", request_id))
        .add_header(name, value)
        .await
}

#[tokio::test]
async fn test_request_slot_is_pending() {
    let ctx = TestContext::new();
    let (user, token) = ctx.user().await;
    let slot = ctx.slot("A1").await;

    let request = file_request(&ctx, &token, slot.id).await;

    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.user_id, user.id);
    assert_eq!(request.slot_id, slot.id);
    assert_eq!(request.start_time, None);
}

#[tokio::test]
async fn test_request_unknown_slot_is_bad_request() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user().await;
    let (name, value) = bearer(&token);

    let response = ctx
        .server
        .post("/api/v1/slot-requests/request")
        .add_header(name, value)
        .json(&json!({ "slotId": Uuid::new_v4() }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "SLOT_UNAVAILABLE");
}

#[tokio::test]
async fn test_request_with_token_for_missing_account_is_unauthorized() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let slot = ctx.slot("A1").await;
    let ghost = User {
        id: Uuid::new_v4(),
        name: "Gone Away".to_string(),
        email: "gone@example.com".to_string(),
        role: Role::User,
        password_hash: None,
        created_at: Utc::now(),
    };
    let (name, value) = bearer(&token_for(&ghost));

    let response = ctx
        .server
        .post("/api/v1/slot-requests/request")
        .add_header(name, value)
        .json(&json!({ "slotId": slot.id }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (name, value) = bearer(&admin_token);
    let all: Value = ctx
        .server
        .get("/api/v1/slot-requests/all-requests")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(all.as_array().map(Vec::len), Some(0));
    ctx.server
        .get("/api/v1/slot-requests/pending")
        .add_header(name, value)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_approved_slot_leaves_available_list_and_blocks_new_requests() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, u_token) = ctx.user().await;
    let (_, v_token) = ctx.user().await;
    let slot = ctx.slot("A1").await;
    ctx.slot("A2").await;

    let request = file_request(&ctx, &u_token, slot.id).await;
    let response = approve(&ctx, &admin_token, request.id).await;
    response.assert_status_ok();
    let approved: SlotRequest = response.json();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert!(approved.start_time.is_some());

    let (name, value) = bearer(&v_token);
    let available: Value = ctx
        .server
        .get("/api/v1/slot-requests/available")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    let numbers: Vec<&str> = available
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|slot| slot["slotNumber"].as_str())
        .collect();
    assert_eq!(numbers, vec!["A2"]);

    let response = ctx
        .server
        .post("/api/v1/slot-requests/request")
        .add_header(name, value)
        .json(&json!({ "slotId": slot.id }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_second_approval_of_contended_slot_fails() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, u_token) = ctx.user().await;
    let (_, v_token) = ctx.user().await;
    let slot = ctx.slot("A1").await;

    let first = file_request(&ctx, &u_token, slot.id).await;
    let second = file_request(&ctx, &v_token, slot.id).await;

    approve(&ctx, &admin_token, first.id).await.assert_status_ok();
    let response = approve(&ctx, &admin_token, second.id).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "SLOT_UNAVAILABLE");
}

#[tokio::test]
async fn test_approving_twice_is_invalid_transition() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, token) = ctx.user().await;
    let slot = ctx.slot("A1").await;
    let request = file_request(&ctx, &token, slot.id).await;

    approve(&ctx, &admin_token, request.id).await.assert_status_ok();
    let response = approve(&ctx, &admin_token, request.id).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_approve_unknown_request_is_not_found() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;

    let response = approve(&ctx, &admin_token, Uuid::new_v4()).await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reject_keeps_slot_free() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, token) = ctx.user().await;
    let slot = ctx.slot("A1").await;
    let request = file_request(&ctx, &token, slot.id).await;

    let (name, value) = bearer(&admin_token);
    let response = ctx
        .server
        .patch(&format!("/api/v1/slot-requests/{}/reject", request.id))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let rejected: SlotRequest = response.json();
    assert_eq!(rejected.status, RequestStatus::Rejected);

    let slot: Value = ctx
        .server
        .get("/api/v1/slots/A1")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(slot["inUse"], false);

    let response = ctx
        .server
        .patch(&format!("/api/v1/slot-requests/{}/reject", request.id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_session_returns_receipt_and_frees_slot() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (user, token) = ctx.user().await;
    let slot = ctx.slot("A1").await;
    let request = file_request(&ctx, &token, slot.id).await;
    approve(&ctx, &admin_token, request.id).await.assert_status_ok();

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .post(&format!("/api/v1/slot-requests/{}/end", request.id))
        .add_header(name.clone(), value.clone())
        .await;

    response.assert_status_ok();
    let receipt: Value = response.json();
    assert_eq!(receipt["slotNumber"], "A1");
    assert_eq!(receipt["userName"], user.name.as_str());
    assert_eq!(receipt["userEmail"], user.email.as_str());
    let minutes = receipt["totalTime"].as_i64().unwrap();
    let charge = receipt["totalCharge"].as_f64().unwrap();
    assert!((charge - minutes as f64 * TEST_RATE).abs() < 1e-9);

    let document = STANDARD
        .decode(receipt["document"].as_str().unwrap())
        .unwrap();
    let ticket = String::from_utf8(document).unwrap();
    assert!(ticket.contains("Slot:     A1"));

    let mine: Value = ctx
        .server
        .get("/api/v1/slot-requests/my-requests")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(mine[0]["status"], "COMPLETED");
    assert_eq!(mine[0]["slot"]["inUse"], false);

    let response = ctx
        .server
        .post(&format!("/api/v1/slot-requests/{}/end", request.id))
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_session_by_other_user_is_forbidden() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, owner_token) = ctx.user().await;
    let (_, other_token) = ctx.user().await;
    let slot = ctx.slot("A1").await;
    let request = file_request(&ctx, &owner_token, slot.id).await;
    approve(&ctx, &admin_token, request.id).await.assert_status_ok();

    let (name, value) = bearer(&other_token);
    let response = ctx
        .server
        .post(&format!("/api/v1/slot-requests/{}/end", request.id))
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_end_pending_session_is_bad_request() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user().await;
    let slot = ctx.slot("A1").await;
    let request = file_request(&ctx, &token, slot.id).await;

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .post(&format!("/api/v1/slot-requests/{}/end", request.id))
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_request_listings() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, u_token) = ctx.user().await;
    let (_, v_token) = ctx.user().await;
    let a1 = ctx.slot("A1").await;
    let a2 = ctx.slot("A2").await;

    let approved = file_request(&ctx, &u_token, a1.id).await;
    file_request(&ctx, &u_token, a2.id).await;
    file_request(&ctx, &v_token, a2.id).await;
    approve(&ctx, &admin_token, approved.id).await.assert_status_ok();

    let (name, value) = bearer(&u_token);
    let mine: Value = ctx
        .server
        .get("/api/v1/slot-requests/my-requests")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(mine.as_array().map(Vec::len), Some(2));

    let response = ctx
        .server
        .get("/api/v1/slot-requests/pending")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let (name, value) = bearer(&admin_token);
    let pending: Value = ctx
        .server
        .get("/api/v1/slot-requests/pending")
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(pending.as_array().map(Vec::len), Some(2));

    let all: Value = ctx
        .server
        .get("/api/v1/slot-requests/all-requests")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(all.as_array().map(Vec::len), Some(3));
}
