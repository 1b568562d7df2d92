use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::test_utils::{bearer, TestContext};

#[tokio::test]
async fn test_create_slot_returns_created() {
    let ctx = TestContext::new();
    let (_, token) = ctx.admin().await;
    let (name, value) = bearer(&token);

    let response = ctx
        .server
        .post("/api/v1/slots")
        .add_header(name, value)
        .json(&json!({ "slotNumber": "A1", "location": "Level 1", "type": "COMPACT" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["slotNumber"], "A1");
    assert_eq!(body["type"], "COMPACT");
    assert_eq!(body["inUse"], false);
}

#[tokio::test]
async fn test_create_duplicate_slot_is_conflict() {
    let ctx = TestContext::new();
    let (_, token) = ctx.admin().await;
    ctx.slot("A1").await;
    let (name, value) = bearer(&token);

    let response = ctx
        .server
        .post("/api/v1/slots")
        .add_header(name, value)
        .json(&json!({ "slotNumber": "A1", "location": "Level 2", "type": "SUV" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "DUPLICATE_SLOT_NUMBER");
}

#[tokio::test]
async fn test_create_slot_with_blank_location_is_bad_request() {
    let ctx = TestContext::new();
    let (_, token) = ctx.admin().await;
    let (name, value) = bearer(&token);

    let response = ctx
        .server
        .post("/api/v1/slots")
        .add_header(name, value)
        .json(&json!({ "slotNumber": "A1", "location": "  ", "type": "COMPACT" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_list_slots_paginates() {
    let ctx = TestContext::new();
    let (_, token) = ctx.admin().await;
    for i in 0..12 {
        ctx.slot(&format!("B{}", i)).await;
    }

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .get("/api/v1/slots")
        .add_query_param("page", 2)
        .add_header(name, value)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["page"], 2);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_get_update_and_delete_slot_by_number() {
    let ctx = TestContext::new();
    let (_, token) = ctx.admin().await;
    ctx.slot("C1").await;

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .get("/api/v1/slots/C1")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();

    let response = ctx
        .server
        .put("/api/v1/slots/C1")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "location": "Roof" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["location"], "Roof");
    assert_eq!(body["slotNumber"], "C1");

    let response = ctx
        .server
        .delete("/api/v1/slots/C1")
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();

    let response = ctx
        .server
        .get("/api/v1/slots/C1")
        .add_header(name, value)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_rename_onto_existing_number_is_conflict() {
    let ctx = TestContext::new();
    let (_, token) = ctx.admin().await;
    ctx.slot("D1").await;
    ctx.slot("D2").await;

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .put("/api/v1/slots/D2")
        .add_header(name, value)
        .json(&json!({ "slotNumber": "D1" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_slot_with_pending_request_is_conflict() {
    let ctx = TestContext::new();
    let (_, admin_token) = ctx.admin().await;
    let (_, user_token) = ctx.user().await;
    let slot = ctx.slot("E1").await;

    let (name, value) = bearer(&user_token);
    ctx.server
        .post("/api/v1/slot-requests/request")
        .add_header(name, value)
        .json(&json!({ "slotId": slot.id }))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = bearer(&admin_token);
    let response = ctx
        .server
        .delete("/api/v1/slots/E1")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "SLOT_IN_USE");
}

#[tokio::test]
async fn test_slot_routes_are_admin_only() {
    let ctx = TestContext::new();
    let (_, token) = ctx.user().await;
    let (name, value) = bearer(&token);

    let response = ctx
        .server
        .get("/api/v1/slots")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "FORBIDDEN");
}
