//! Persistence interface consumed by the registry and the ledger.
//!
//! Implementations must surface unique-constraint violations as
//! [`StoreError::UniqueViolation`] and dangling references as
//! [`StoreError::MissingReference`], and must apply [`Transition`]s and slot
//! deletes atomically.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::ParkError;
use crate::models::{
    slot::{NewParkingSlot, ParkingSlot, SlotDeletion, SlotPatch},
    slot_request::{
        RequestFilter, RequestStatus, SlotRequest, SlotRequestDetails, Transition,
        TransitionOutcome,
    },
    user::{NewUser, User},
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A written row points at a record that does not exist.
    #[error("Foreign key violated: {0}")]
    MissingReference(String),

    #[error(transparent)]
    Backend(#[from] eyre::Report),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ParkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => {
                ParkError::Database(eyre::eyre!("Unique constraint violated: {}", constraint))
            }
            StoreError::MissingReference(constraint) => {
                ParkError::Database(eyre::eyre!("Foreign key violated: {}", constraint))
            }
            StoreError::Backend(report) => ParkError::Database(report),
        }
    }
}

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn insert_slot(&self, slot: &NewParkingSlot) -> StoreResult<ParkingSlot>;

    async fn find_slot_by_id(&self, id: Uuid) -> StoreResult<Option<ParkingSlot>>;

    async fn find_slot_by_number(&self, slot_number: &str) -> StoreResult<Option<ParkingSlot>>;

    /// Slots ordered by ascending id.
    async fn list_slots_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<ParkingSlot>>;

    async fn count_slots(&self) -> StoreResult<i64>;

    async fn count_free_slots(&self) -> StoreResult<i64>;

    /// Returns `None` when no slot carries `slot_number`.
    async fn update_slot(
        &self,
        slot_number: &str,
        patch: &SlotPatch,
    ) -> StoreResult<Option<ParkingSlot>>;

    /// Removes the slot unless it is in use or referenced by a PENDING or
    /// APPROVED request. The check and the delete are one atomic step.
    async fn delete_slot(&self, slot_number: &str) -> StoreResult<SlotDeletion>;

    /// Free slots, most recently created first.
    async fn list_free_slots(&self) -> StoreResult<Vec<ParkingSlot>>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Fails with [`StoreError::MissingReference`] if the slot or user is unknown.
    async fn insert_request(
        &self,
        slot_id: Uuid,
        user_id: Uuid,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<SlotRequest>;

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<SlotRequest>>;

    async fn find_request_details(&self, id: Uuid) -> StoreResult<Option<SlotRequestDetails>>;

    /// Newest first.
    async fn list_request_details(
        &self,
        filter: RequestFilter,
    ) -> StoreResult<Vec<SlotRequestDetails>>;

    async fn count_requests_by_status(&self, status: RequestStatus) -> StoreResult<i64>;

    /// Applies the request and slot writes of `transition` as one unit of work.
    async fn commit_transition(&self, transition: &Transition) -> StoreResult<TransitionOutcome>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
}

/// Everything the service needs from its persistence layer.
pub trait ParkingStore: SlotStore + RequestStore + UserStore {}

impl<T: SlotStore + RequestStore + UserStore> ParkingStore for T {}
