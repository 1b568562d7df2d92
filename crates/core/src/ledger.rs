//! # Request Ledger
//!
//! Owns the slot-request lifecycle:
//!
//! ```text
//! PENDING ──approve──▶ APPROVED ──end──▶ COMPLETED
//!    │
//!    └──reject──▶ REJECTED
//! ```
//!
//! REJECTED and COMPLETED are terminal. Every status change that also moves a
//! slot's occupancy flag is handed to the store as one [`Transition`], so no
//! reader ever sees an APPROVED request on a free slot.
//!
//! Requesting a slot does not reserve it. Several users may hold PENDING
//! requests for the same free slot; the first approval takes the slot lock and
//! later approvals fail with `SlotUnavailable`.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{self, Identity};
use crate::billing::{self, SessionBilling};
use crate::errors::{ParkError, ParkResult};
use crate::models::slot_request::{
    RequestFilter, RequestStatus, SlotRequest, SlotRequestDetails, Transition, TransitionOutcome,
};
use crate::models::user::Role;
use crate::receipt::{Receipt, ReceiptFields, TicketRenderer};
use crate::store::{ParkingStore, StoreError};

fn request_not_found(request_id: Uuid) -> ParkError {
    ParkError::NotFound(format!("Request {} not found", request_id))
}

fn invalid_transition(request: &SlotRequest, target: RequestStatus) -> ParkError {
    ParkError::InvalidTransition(format!(
        "Request {} is {} and cannot become {}",
        request.id, request.status, target
    ))
}

async fn load_request(store: &dyn ParkingStore, request_id: Uuid) -> ParkResult<SlotRequest> {
    store
        .find_request(request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))
}

/// Checks that `request` may move to the target of `transition`.
fn ensure_transition(request: &SlotRequest, transition: &Transition) -> ParkResult<()> {
    let target = transition.target_status();
    if request.status.can_transition_to(target) {
        Ok(())
    } else {
        Err(invalid_transition(request, target))
    }
}

async fn commit(
    store: &dyn ParkingStore,
    request: &SlotRequest,
    transition: Transition,
) -> ParkResult<SlotRequest> {
    match store.commit_transition(&transition).await? {
        TransitionOutcome::Applied(updated) => Ok(updated),
        TransitionOutcome::StaleStatus => {
            warn!(request_id = %request.id, "Request changed status concurrently");
            Err(ParkError::InvalidTransition(format!(
                "Request {} is no longer {}",
                request.id,
                transition.expected_status()
            )))
        }
        TransitionOutcome::SlotHeld => Err(ParkError::SlotUnavailable(format!(
            "Slot {} is already occupied",
            request.slot_id
        ))),
    }
}

/// Files a PENDING request for a free slot.
///
/// # Errors
///
/// * `ParkError::Unauthorized` - `user_id` has no account
/// * `ParkError::SlotUnavailable` - the slot does not exist or is occupied
pub async fn request_slot(
    store: &dyn ParkingStore,
    user_id: Uuid,
    slot_id: Uuid,
    now: DateTime<Utc>,
) -> ParkResult<SlotRequest> {
    if store.find_user(user_id).await?.is_none() {
        return Err(ParkError::Unauthorized(format!(
            "User {} has no account",
            user_id
        )));
    }

    let unavailable = || ParkError::SlotUnavailable(format!("Slot {} is not available", slot_id));
    match store.find_slot_by_id(slot_id).await? {
        Some(slot) if !slot.in_use => {}
        _ => return Err(unavailable()),
    }

    let request = match store.insert_request(slot_id, user_id, now).await {
        Ok(request) => request,
        // The slot was deleted after the lookup.
        Err(StoreError::MissingReference(_)) => return Err(unavailable()),
        Err(other) => return Err(other.into()),
    };
    info!(request_id = %request.id, %slot_id, %user_id, "Slot requested");
    Ok(request)
}

/// Approves a PENDING request, starting its session and occupying the slot.
///
/// # Errors
///
/// * `ParkError::Forbidden` - caller is not an admin
/// * `ParkError::NotFound` - no such request
/// * `ParkError::InvalidTransition` - request is not PENDING
/// * `ParkError::SlotUnavailable` - another session already holds the slot
pub async fn approve_request(
    store: &dyn ParkingStore,
    identity: &Identity,
    request_id: Uuid,
    now: DateTime<Utc>,
) -> ParkResult<SlotRequest> {
    access::require_role(identity, Role::Admin)?;
    let request = load_request(store, request_id).await?;

    let transition = Transition::Approve {
        request_id,
        slot_id: request.slot_id,
        start_time: now,
    };
    ensure_transition(&request, &transition)?;

    let approved = commit(store, &request, transition).await?;
    info!(%request_id, slot_id = %approved.slot_id, admin_id = %identity.id, "Request approved");
    Ok(approved)
}

/// Rejects a PENDING request. Slot occupancy is left alone.
///
/// # Errors
///
/// * `ParkError::Forbidden` - caller is not an admin
/// * `ParkError::NotFound` - no such request
/// * `ParkError::InvalidTransition` - request is not PENDING
pub async fn reject_request(
    store: &dyn ParkingStore,
    identity: &Identity,
    request_id: Uuid,
) -> ParkResult<SlotRequest> {
    access::require_role(identity, Role::Admin)?;
    let request = load_request(store, request_id).await?;

    let transition = Transition::Reject { request_id };
    ensure_transition(&request, &transition)?;

    let rejected = commit(store, &request, transition).await?;
    info!(%request_id, admin_id = %identity.id, "Request rejected");
    Ok(rejected)
}

/// Ends the caller's active session, bills it, frees the slot and returns
/// the receipt.
///
/// # Errors
///
/// * `ParkError::NotFound` - no such request
/// * `ParkError::Forbidden` - caller did not file the request
/// * `ParkError::InvalidTransition` - request is not APPROVED
/// * `ParkError::InvalidState` - approved request has no start time
/// * `ParkError::InvalidArgument` - `now` precedes the start time
pub async fn end_session(
    store: &dyn ParkingStore,
    billing: &SessionBilling,
    renderer: &dyn TicketRenderer,
    request_id: Uuid,
    caller_id: Uuid,
    now: DateTime<Utc>,
) -> ParkResult<Receipt> {
    let request = load_request(store, request_id).await?;
    access::require_owner(caller_id, request.user_id)?;

    if request.status != RequestStatus::Approved {
        return Err(invalid_transition(&request, RequestStatus::Completed));
    }
    let start_time = request.start_time.ok_or_else(|| {
        ParkError::InvalidState(format!(
            "Approved request {} has no start time",
            request_id
        ))
    })?;

    if now < start_time {
        return Err(ParkError::InvalidArgument(format!(
            "End time {} precedes start time {}",
            now, start_time
        )));
    }

    let total_time = billing::billable_minutes(start_time, now);
    let total_charge = billing.compute(total_time)?;

    let transition = Transition::Complete {
        request_id,
        slot_id: request.slot_id,
        end_time: now,
        total_time,
        total_charge,
    };
    commit(store, &request, transition).await?;
    info!(%request_id, total_time, total_charge, "Session ended");

    let details = store
        .find_request_details(request_id)
        .await?
        .ok_or_else(|| request_not_found(request_id))?;
    Receipt::render(ReceiptFields::from_details(&details)?, renderer)
}

pub async fn list_for_user(
    store: &dyn ParkingStore,
    user_id: Uuid,
) -> ParkResult<Vec<SlotRequestDetails>> {
    Ok(store.list_request_details(RequestFilter::User(user_id)).await?)
}

pub async fn list_pending(
    store: &dyn ParkingStore,
    identity: &Identity,
) -> ParkResult<Vec<SlotRequestDetails>> {
    access::require_role(identity, Role::Admin)?;
    Ok(store
        .list_request_details(RequestFilter::Status(RequestStatus::Pending))
        .await?)
}

pub async fn list_all(
    store: &dyn ParkingStore,
    identity: &Identity,
) -> ParkResult<Vec<SlotRequestDetails>> {
    access::require_role(identity, Role::Admin)?;
    Ok(store.list_request_details(RequestFilter::All).await?)
}
