//! Postgres implementation of the core store traits.
//!
//! Thin adapter over the free functions in [`crate::repositories`]: rows are
//! converted into core models, unique violations are lifted into
//! [`StoreError::UniqueViolation`] and foreign key violations into
//! [`StoreError::MissingReference`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parkslot_core::{
    models::{
        slot::{NewParkingSlot, ParkingSlot, SlotDeletion, SlotPatch},
        slot_request::{
            RequestFilter, RequestStatus, SlotRequest, SlotRequestDetails, Transition,
            TransitionOutcome,
        },
        user::{NewUser, User},
    },
    store::{RequestStore, SlotStore, StoreError, StoreResult, UserStore},
};
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::{
    self,
    slot_request::TransitionWrite,
    slot, slot_request, user,
};

fn store_error(err: eyre::Report) -> StoreError {
    if let Some(constraint) = repositories::unique_violation(&err) {
        return StoreError::UniqueViolation(constraint);
    }
    match repositories::foreign_key_violation(&err) {
        Some(constraint) => StoreError::MissingReference(constraint),
        None => StoreError::Backend(err),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for PgStore {
    async fn insert_slot(&self, new_slot: &NewParkingSlot) -> StoreResult<ParkingSlot> {
        let row = slot::create_slot(&self.pool, new_slot)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn find_slot_by_id(&self, id: Uuid) -> StoreResult<Option<ParkingSlot>> {
        let row = slot::get_slot_by_id(&self.pool, id).await?;
        Ok(row.map(Into::into))
    }

    async fn find_slot_by_number(&self, slot_number: &str) -> StoreResult<Option<ParkingSlot>> {
        let row = slot::get_slot_by_number(&self.pool, slot_number).await?;
        Ok(row.map(Into::into))
    }

    async fn list_slots_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<ParkingSlot>> {
        let rows = slot::list_slots(&self.pool, offset, limit).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_slots(&self) -> StoreResult<i64> {
        Ok(slot::count_slots(&self.pool).await?)
    }

    async fn count_free_slots(&self) -> StoreResult<i64> {
        Ok(slot::count_free_slots(&self.pool).await?)
    }

    async fn update_slot(
        &self,
        slot_number: &str,
        patch: &SlotPatch,
    ) -> StoreResult<Option<ParkingSlot>> {
        let row = slot::update_slot(&self.pool, slot_number, patch)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_slot(&self, slot_number: &str) -> StoreResult<SlotDeletion> {
        Ok(slot::delete_slot(&self.pool, slot_number).await?)
    }

    async fn list_free_slots(&self) -> StoreResult<Vec<ParkingSlot>> {
        let rows = slot::list_free_slots(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl RequestStore for PgStore {
    async fn insert_request(
        &self,
        slot_id: Uuid,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> StoreResult<SlotRequest> {
        let row = slot_request::create_request(&self.pool, slot_id, user_id, created_at)
            .await
            .map_err(store_error)?;
        Ok(SlotRequest::try_from(row)?)
    }

    async fn find_request(&self, id: Uuid) -> StoreResult<Option<SlotRequest>> {
        let row = slot_request::get_request_by_id(&self.pool, id).await?;
        Ok(row.map(SlotRequest::try_from).transpose()?)
    }

    async fn find_request_details(&self, id: Uuid) -> StoreResult<Option<SlotRequestDetails>> {
        let row = slot_request::get_request_details(&self.pool, id).await?;
        Ok(row.map(SlotRequestDetails::try_from).transpose()?)
    }

    async fn list_request_details(
        &self,
        filter: RequestFilter,
    ) -> StoreResult<Vec<SlotRequestDetails>> {
        let rows = slot_request::list_request_details(&self.pool, filter).await?;
        let details = rows
            .into_iter()
            .map(SlotRequestDetails::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(details)
    }

    async fn count_requests_by_status(&self, status: RequestStatus) -> StoreResult<i64> {
        Ok(slot_request::count_requests_by_status(&self.pool, status).await?)
    }

    async fn commit_transition(&self, transition: &Transition) -> StoreResult<TransitionOutcome> {
        let written = match slot_request::commit_transition(&self.pool, transition).await {
            Ok(written) => written,
            // The one-approved-per-slot index caught an approval the slot
            // flag did not.
            Err(err) if matches!(transition, Transition::Approve { .. }) => {
                match store_error(err) {
                    StoreError::UniqueViolation(_) => TransitionWrite::SlotHeld,
                    other => return Err(other),
                }
            }
            Err(err) => return Err(store_error(err)),
        };

        Ok(match written {
            TransitionWrite::Applied(row) => TransitionOutcome::Applied(SlotRequest::try_from(row)?),
            TransitionWrite::StaleStatus => TransitionOutcome::StaleStatus,
            TransitionWrite::SlotHeld => TransitionOutcome::SlotHeld,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new_user: &NewUser) -> StoreResult<User> {
        let row = user::create_user(&self.pool, new_user)
            .await
            .map_err(store_error)?;
        Ok(User::try_from(row)?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = user::get_user_by_id(&self.pool, id).await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = user::get_user_by_email(&self.pool, email).await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = user::list_users(&self.pool).await?;
        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(users)
    }
}
