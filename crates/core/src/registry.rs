//! # Slot Registry
//!
//! CRUD over parking slots plus the availability query. Occupancy is never
//! written here; it only moves through ledger transitions.

use tracing::{debug, info};

use crate::errors::{ParkError, ParkResult};
use crate::models::slot::{
    NewParkingSlot, ParkingSlot, SLOT_PAGE_SIZE, SlotDeletion, SlotPage, SlotPatch,
};
use crate::store::{ParkingStore, StoreError};

fn required(field: &str, value: &str) -> ParkResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ParkError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn duplicate_or(err: StoreError, slot_number: &str) -> ParkError {
    match err {
        StoreError::UniqueViolation(_) => ParkError::DuplicateSlotNumber(format!(
            "Slot number {} already exists. Please provide a unique slot number",
            slot_number
        )),
        other => other.into(),
    }
}

fn slot_not_found(slot_number: &str) -> ParkError {
    ParkError::NotFound(format!("Slot number {} not found", slot_number))
}

/// Registers a new, unoccupied slot.
///
/// # Errors
///
/// * `ParkError::Validation` - a field is blank
/// * `ParkError::DuplicateSlotNumber` - the number is taken
pub async fn create_slot(store: &dyn ParkingStore, slot: NewParkingSlot) -> ParkResult<ParkingSlot> {
    let slot = NewParkingSlot {
        slot_number: required("slotNumber", &slot.slot_number)?,
        location: required("location", &slot.location)?,
        slot_type: required("type", &slot.slot_type)?,
    };

    let created = store
        .insert_slot(&slot)
        .await
        .map_err(|e| duplicate_or(e, &slot.slot_number))?;

    info!(slot_id = %created.id, slot_number = %created.slot_number, "Parking slot created");
    Ok(created)
}

/// One page of slots ordered by id. Pages start at 1; anything lower is
/// treated as the first page.
pub async fn list_slots(store: &dyn ParkingStore, page: Option<i64>) -> ParkResult<SlotPage> {
    let page = page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(SLOT_PAGE_SIZE);

    let data = store.list_slots_page(offset, SLOT_PAGE_SIZE).await?;
    let total = store.count_slots().await?;
    let total_pages = (total + SLOT_PAGE_SIZE - 1) / SLOT_PAGE_SIZE;

    debug!(page, total, "Listed parking slots");
    Ok(SlotPage {
        data,
        page,
        page_size: SLOT_PAGE_SIZE,
        total,
        total_pages,
    })
}

pub async fn get_slot_by_number(
    store: &dyn ParkingStore,
    slot_number: &str,
) -> ParkResult<ParkingSlot> {
    store
        .find_slot_by_number(slot_number)
        .await?
        .ok_or_else(|| slot_not_found(slot_number))
}

/// Applies `patch` to the slot carrying `slot_number`.
///
/// # Errors
///
/// * `ParkError::Validation` - a supplied field is blank
/// * `ParkError::DuplicateSlotNumber` - the new number belongs to another slot
/// * `ParkError::NotFound` - no slot carries `slot_number`
pub async fn update_slot(
    store: &dyn ParkingStore,
    slot_number: &str,
    patch: SlotPatch,
) -> ParkResult<ParkingSlot> {
    let patch = SlotPatch {
        slot_number: patch
            .slot_number
            .map(|v| required("slotNumber", &v))
            .transpose()?,
        location: patch.location.map(|v| required("location", &v)).transpose()?,
        slot_type: patch.slot_type.map(|v| required("type", &v)).transpose()?,
    };
    let target_number = patch.slot_number.as_deref().unwrap_or(slot_number);

    let updated = store
        .update_slot(slot_number, &patch)
        .await
        .map_err(|e| duplicate_or(e, target_number))?
        .ok_or_else(|| slot_not_found(slot_number))?;

    info!(slot_id = %updated.id, slot_number = %updated.slot_number, "Parking slot updated");
    Ok(updated)
}

/// Removes a slot nobody is using or waiting for.
///
/// # Errors
///
/// * `ParkError::NotFound` - no slot carries `slot_number`
/// * `ParkError::SlotInUse` - the slot is occupied or has PENDING/APPROVED requests
pub async fn delete_slot(store: &dyn ParkingStore, slot_number: &str) -> ParkResult<()> {
    match store.delete_slot(slot_number).await? {
        SlotDeletion::Deleted => {
            info!(slot_number, "Parking slot deleted");
            Ok(())
        }
        SlotDeletion::NotFound => Err(slot_not_found(slot_number)),
        SlotDeletion::InUse => Err(ParkError::SlotInUse(format!(
            "Slot number {} is occupied or has open requests and cannot be deleted",
            slot_number
        ))),
    }
}

/// Unoccupied slots, most recently created first.
pub async fn list_available(store: &dyn ParkingStore) -> ParkResult<Vec<ParkingSlot>> {
    Ok(store.list_free_slots().await?)
}
