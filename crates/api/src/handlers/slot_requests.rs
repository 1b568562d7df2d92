use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use parkslot_core::{
    ledger,
    models::{
        slot::ParkingSlot,
        slot_request::{CreateSlotRequestBody, SlotRequest, SlotRequestDetails},
    },
    receipt::Receipt,
    registry,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    middleware::{
        auth::{AdminUser, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn available_slots(
    _user: AuthUser,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ParkingSlot>>, AppError> {
    let slots = registry::list_available(state.store.as_ref()).await?;
    Ok(Json(slots))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn request_slot(
    user: AuthUser,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateSlotRequestBody>,
) -> Result<(StatusCode, Json<SlotRequest>), AppError> {
    let request = ledger::request_slot(
        state.store.as_ref(),
        user.identity.id,
        payload.slot_id,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn my_requests(
    user: AuthUser,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<SlotRequestDetails>>, AppError> {
    let requests = ledger::list_for_user(state.store.as_ref(), user.identity.id).await?;
    Ok(Json(requests))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn pending_requests(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<SlotRequestDetails>>, AppError> {
    let requests = ledger::list_pending(state.store.as_ref(), &admin).await?;
    Ok(Json(requests))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn all_requests(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<SlotRequestDetails>>, AppError> {
    let requests = ledger::list_all(state.store.as_ref(), &admin).await?;
    Ok(Json(requests))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn approve_request(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<SlotRequest>, AppError> {
    let request =
        ledger::approve_request(state.store.as_ref(), &admin, request_id, Utc::now()).await?;
    Ok(Json(request))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn reject_request(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<SlotRequest>, AppError> {
    let request = ledger::reject_request(state.store.as_ref(), &admin, request_id).await?;
    Ok(Json(request))
}

/// Ends the caller's session and returns the receipt.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn end_session(
    user: AuthUser,
    State(state): State<Arc<ApiState>>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Receipt>, AppError> {
    let receipt = ledger::end_session(
        state.store.as_ref(),
        &state.billing,
        state.ticket.as_ref(),
        request_id,
        user.identity.id,
        Utc::now(),
    )
    .await?;
    Ok(Json(receipt))
}
