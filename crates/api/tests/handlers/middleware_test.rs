use std::sync::Arc;

use argon2::PasswordVerifier;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use mockall::predicate;
use parkslot_api::middleware::{auth, error_handling::AppError};
use parkslot_core::{errors::ParkError, models::user::Role, store::StoreError};
use parkslot_db::mock::repositories::MockStore;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use crate::test_utils::{bearer, claims_for, server_for, sign, TestContext, TEST_SECRET};

#[rstest]
#[case(ParkError::NotFound("x".into()), StatusCode::NOT_FOUND)]
#[case(ParkError::DuplicateSlotNumber("x".into()), StatusCode::CONFLICT)]
#[case(ParkError::SlotInUse("x".into()), StatusCode::CONFLICT)]
#[case(ParkError::SlotUnavailable("x".into()), StatusCode::BAD_REQUEST)]
#[case(ParkError::InvalidTransition("x".into()), StatusCode::BAD_REQUEST)]
#[case(ParkError::InvalidState("x".into()), StatusCode::BAD_REQUEST)]
#[case(ParkError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST)]
#[case(ParkError::Validation("x".into()), StatusCode::BAD_REQUEST)]
#[case(ParkError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED)]
#[case(ParkError::Forbidden("x".into()), StatusCode::FORBIDDEN)]
#[case(ParkError::Database(eyre::eyre!("x")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: ParkError, #[case] expected: StatusCode) {
    assert_eq!(AppError(error).into_response().status(), expected);
}

#[test]
fn test_internal_error_is_server_error() {
    let error = ParkError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    assert_eq!(AppError(error).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_hash_password() {
    let password = "admin_password";
    let hashed = auth::hash_password(password).unwrap();

    assert_ne!(hashed, password);
    assert!(hashed.starts_with("$argon2"));

    let parsed_hash = argon2::PasswordHash::new(&hashed).unwrap();
    let argon2 = argon2::Argon2::default();
    assert!(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok());
    assert!(argon2.verify_password(b"wrong_password", &parsed_hash).is_err());
}

#[tokio::test]
async fn test_health_and_version_need_no_token() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");

    ctx.server.get("/version").await.assert_status_ok();
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/v1/slot-requests/available").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/v1/slot-requests/available")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic YWRtaW46YWRtaW4="))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let ctx = TestContext::new();
    let (user, _) = ctx.user().await;
    let token = sign(&claims_for(&user), "not-the-secret");

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .get("/api/v1/slot-requests/available")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let ctx = TestContext::new();
    let (user, _) = ctx.user().await;
    let mut claims = claims_for(&user);
    claims.exp = (Utc::now() - Duration::minutes(5)).timestamp();
    let token = sign(&claims, TEST_SECRET);

    let (name, value) = bearer(&token);
    let response = ctx
        .server
        .get("/api/v1/slot-requests/my-requests")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_storage_failure_is_opaque_server_error() {
    let mut store = MockStore::new();
    store
        .expect_list_free_slots()
        .times(1)
        .returning(|| Err(StoreError::Backend(eyre::eyre!("connection refused"))));
    let server = server_for(Arc::new(store));

    let token = sign(
        &auth::Claims {
            id: Uuid::new_v4(),
            role: Role::User,
            email: "driver@example.com".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        },
        TEST_SECRET,
    );
    let (name, value) = bearer(&token);
    let response = server
        .get("/api/v1/slot-requests/available")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "DATABASE");
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_admin_extractor_checks_role_before_touching_store() {
    let mut store = MockStore::new();
    store.expect_list_users().never();
    store
        .expect_find_user()
        .with(predicate::always())
        .never();
    let server = server_for(Arc::new(store));

    let token = sign(
        &auth::Claims {
            id: Uuid::new_v4(),
            role: Role::User,
            email: "driver@example.com".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        },
        TEST_SECRET,
    );
    let (name, value) = bearer(&token);
    let response = server
        .get("/api/v1/admin/all-users")
        .add_header(name, value)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
