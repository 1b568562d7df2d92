use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use parkslot_core::{
    models::slot::{DeleteSlotResponse, NewParkingSlot, ParkingSlot, SlotPage, SlotPageQuery, SlotPatch},
    registry,
};
use std::sync::Arc;

use crate::{
    middleware::{auth::AdminUser, error_handling::AppError},
    ApiState,
};

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_slot(
    _admin: AdminUser,
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<NewParkingSlot>,
) -> Result<(StatusCode, Json<ParkingSlot>), AppError> {
    let slot = registry::create_slot(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_slots(
    _admin: AdminUser,
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SlotPageQuery>,
) -> Result<Json<SlotPage>, AppError> {
    let page = registry::list_slots(state.store.as_ref(), query.page).await?;
    Ok(Json(page))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_slot(
    _admin: AdminUser,
    State(state): State<Arc<ApiState>>,
    Path(slot_number): Path<String>,
) -> Result<Json<ParkingSlot>, AppError> {
    let slot = registry::get_slot_by_number(state.store.as_ref(), &slot_number).await?;
    Ok(Json(slot))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn update_slot(
    _admin: AdminUser,
    State(state): State<Arc<ApiState>>,
    Path(slot_number): Path<String>,
    Json(patch): Json<SlotPatch>,
) -> Result<Json<ParkingSlot>, AppError> {
    let slot = registry::update_slot(state.store.as_ref(), &slot_number, patch).await?;
    Ok(Json(slot))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn delete_slot(
    _admin: AdminUser,
    State(state): State<Arc<ApiState>>,
    Path(slot_number): Path<String>,
) -> Result<Json<DeleteSlotResponse>, AppError> {
    registry::delete_slot(state.store.as_ref(), &slot_number).await?;
    Ok(Json(DeleteSlotResponse {
        message: format!("Slot number {} deleted", slot_number),
    }))
}
