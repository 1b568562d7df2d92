//! In-process [`ParkingStore`](super::ParkingStore) backed by vectors behind a
//! single mutex. Every call, including a whole transition, runs under the lock,
//! which gives the same all-or-nothing behaviour the Postgres store gets from a
//! transaction.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::eyre;
use uuid::Uuid;

use super::{RequestStore, SlotStore, StoreError, StoreResult, UserStore};
use crate::models::{
    slot::{NewParkingSlot, ParkingSlot, SlotDeletion, SlotPatch},
    slot_request::{
        RequestFilter, RequestStatus, SlotRequest, SlotRequestDetails, Transition,
        TransitionOutcome,
    },
    user::{NewUser, User},
};

#[derive(Debug, Default)]
struct MemoryState {
    // Insertion order doubles as creation order.
    slots: Vec<ParkingSlot>,
    requests: Vec<SlotRequest>,
    users: Vec<User>,
}

impl MemoryState {
    fn slot_mut(&mut self, id: Uuid) -> Option<&mut ParkingSlot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    /// Check-and-set of the occupancy flag. Returns whether the flag changed.
    fn set_in_use(&mut self, slot_id: Uuid, value: bool) -> bool {
        match self.slot_mut(slot_id) {
            Some(slot) if slot.in_use != value => {
                slot.in_use = value;
                slot.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    fn details(&self, request: &SlotRequest) -> StoreResult<SlotRequestDetails> {
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.id == request.slot_id)
            .ok_or_else(|| eyre!("Request {} references missing slot", request.id))?;
        let user = self
            .users
            .iter()
            .find(|user| user.id == request.user_id)
            .ok_or_else(|| eyre!("Request {} references missing user", request.id))?;

        Ok(SlotRequestDetails {
            request: request.clone(),
            slot: slot.clone(),
            user: user.summary(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend(eyre!("Memory store lock poisoned")))
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn insert_slot(&self, slot: &NewParkingSlot) -> StoreResult<ParkingSlot> {
        let mut state = self.lock()?;
        if state
            .slots
            .iter()
            .any(|existing| existing.slot_number == slot.slot_number)
        {
            return Err(StoreError::UniqueViolation("slot_number".to_string()));
        }

        let now = Utc::now();
        let created = ParkingSlot {
            id: Uuid::new_v4(),
            slot_number: slot.slot_number.clone(),
            location: slot.location.clone(),
            slot_type: slot.slot_type.clone(),
            in_use: false,
            created_at: now,
            updated_at: now,
        };
        state.slots.push(created.clone());
        Ok(created)
    }

    async fn find_slot_by_id(&self, id: Uuid) -> StoreResult<Option<ParkingSlot>> {
        let state = self.lock()?;
        Ok(state.slots.iter().find(|slot| slot.id == id).cloned())
    }

    async fn find_slot_by_number(&self, slot_number: &str) -> StoreResult<Option<ParkingSlot>> {
        let state = self.lock()?;
        Ok(state
            .slots
            .iter()
            .find(|slot| slot.slot_number == slot_number)
            .cloned())
    }

    async fn list_slots_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<ParkingSlot>> {
        let state = self.lock()?;
        let mut slots = state.slots.clone();
        slots.sort_by_key(|slot| slot.id);
        Ok(slots
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_slots(&self) -> StoreResult<i64> {
        Ok(self.lock()?.slots.len() as i64)
    }

    async fn count_free_slots(&self) -> StoreResult<i64> {
        Ok(self.lock()?.slots.iter().filter(|slot| !slot.in_use).count() as i64)
    }

    async fn update_slot(
        &self,
        slot_number: &str,
        patch: &SlotPatch,
    ) -> StoreResult<Option<ParkingSlot>> {
        let mut state = self.lock()?;

        if let Some(new_number) = &patch.slot_number {
            let collides = state
                .slots
                .iter()
                .any(|slot| slot.slot_number == *new_number && slot.slot_number != slot_number);
            if collides {
                return Err(StoreError::UniqueViolation("slot_number".to_string()));
            }
        }

        let Some(slot) = state
            .slots
            .iter_mut()
            .find(|slot| slot.slot_number == slot_number)
        else {
            return Ok(None);
        };

        if let Some(new_number) = &patch.slot_number {
            slot.slot_number = new_number.clone();
        }
        if let Some(location) = &patch.location {
            slot.location = location.clone();
        }
        if let Some(slot_type) = &patch.slot_type {
            slot.slot_type = slot_type.clone();
        }
        slot.updated_at = Utc::now();

        Ok(Some(slot.clone()))
    }

    async fn delete_slot(&self, slot_number: &str) -> StoreResult<SlotDeletion> {
        let mut state = self.lock()?;
        let Some(position) = state
            .slots
            .iter()
            .position(|slot| slot.slot_number == slot_number)
        else {
            return Ok(SlotDeletion::NotFound);
        };

        let slot_id = state.slots[position].id;
        let referenced = state.requests.iter().any(|request| {
            request.slot_id == slot_id
                && matches!(
                    request.status,
                    RequestStatus::Pending | RequestStatus::Approved
                )
        });
        if state.slots[position].in_use || referenced {
            return Ok(SlotDeletion::InUse);
        }

        state.slots.remove(position);
        // Mirrors the ON DELETE CASCADE on slot_requests.slot_id.
        state.requests.retain(|request| request.slot_id != slot_id);
        Ok(SlotDeletion::Deleted)
    }

    async fn list_free_slots(&self) -> StoreResult<Vec<ParkingSlot>> {
        let state = self.lock()?;
        Ok(state
            .slots
            .iter()
            .rev()
            .filter(|slot| !slot.in_use)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(
        &self,
        slot_id: Uuid,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> StoreResult<SlotRequest> {
        let mut state = self.lock()?;
        if !state.slots.iter().any(|slot| slot.id == slot_id) {
            return Err(StoreError::MissingReference(format!(
                "slot {} does not exist",
                slot_id
            )));
        }
        if !state.users.iter().any(|user| user.id == user_id) {
            return Err(StoreError::MissingReference(format!(
                "user {} does not exist",
                user_id
            )));
        }

        let request = SlotRequest {
            id: Uuid::new_v4(),
            slot_id,
            user_id,
            status: RequestStatus::Pending,
            start_time: None,
            end_time: None,
            total_time: None,
            total_charge: None,
            created_at,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<SlotRequest>> {
        let state = self.lock()?;
        Ok(state.requests.iter().find(|request| request.id == id).cloned())
    }

    async fn find_request_details(&self, id: Uuid) -> StoreResult<Option<SlotRequestDetails>> {
        let state = self.lock()?;
        state
            .requests
            .iter()
            .find(|request| request.id == id)
            .map(|request| state.details(request))
            .transpose()
    }

    async fn list_request_details(
        &self,
        filter: RequestFilter,
    ) -> StoreResult<Vec<SlotRequestDetails>> {
        let state = self.lock()?;
        state
            .requests
            .iter()
            .rev()
            .filter(|request| match filter {
                RequestFilter::User(user_id) => request.user_id == user_id,
                RequestFilter::Status(status) => request.status == status,
                RequestFilter::All => true,
            })
            .map(|request| state.details(request))
            .collect()
    }

    async fn count_requests_by_status(&self, status: RequestStatus) -> StoreResult<i64> {
        let state = self.lock()?;
        Ok(state
            .requests
            .iter()
            .filter(|request| request.status == status)
            .count() as i64)
    }

    async fn commit_transition(&self, transition: &Transition) -> StoreResult<TransitionOutcome> {
        let mut state = self.lock()?;
        let request_id = transition.request_id();

        let Some(index) = state
            .requests
            .iter()
            .position(|request| request.id == request_id)
        else {
            return Ok(TransitionOutcome::StaleStatus);
        };
        if state.requests[index].status != transition.expected_status() {
            return Ok(TransitionOutcome::StaleStatus);
        }

        match transition {
            Transition::Approve {
                slot_id,
                start_time,
                ..
            } => {
                if !state.set_in_use(*slot_id, true) {
                    return Ok(TransitionOutcome::SlotHeld);
                }
                let request = &mut state.requests[index];
                request.status = RequestStatus::Approved;
                request.start_time = Some(*start_time);
            }
            Transition::Reject { .. } => {
                state.requests[index].status = RequestStatus::Rejected;
            }
            Transition::Complete {
                slot_id,
                end_time,
                total_time,
                total_charge,
                ..
            } => {
                if !state.set_in_use(*slot_id, false) {
                    tracing::warn!(%slot_id, "Completed session on a slot that was not occupied");
                }
                let request = &mut state.requests[index];
                request.status = RequestStatus::Completed;
                request.end_time = Some(*end_time);
                request.total_time = Some(*total_time);
                request.total_charge = Some(*total_charge);
            }
        }

        Ok(TransitionOutcome::Applied(state.requests[index].clone()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(StoreError::UniqueViolation("email".to_string()));
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().rev().cloned().collect())
    }
}
