use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use parkslot_core::{
    models::{
        slot::{NewParkingSlot, ParkingSlot, SlotDeletion, SlotPatch},
        slot_request::{
            RequestFilter, RequestStatus, SlotRequest, SlotRequestDetails, Transition,
            TransitionOutcome,
        },
        user::{NewUser, User},
    },
    store::{RequestStore, SlotStore, StoreResult, UserStore},
};
use uuid::Uuid;

// Mock store for testing
mock! {
    pub Store {}

    #[async_trait]
    impl SlotStore for Store {
        async fn insert_slot(&self, slot: &NewParkingSlot) -> StoreResult<ParkingSlot>;

        async fn find_slot_by_id(&self, id: Uuid) -> StoreResult<Option<ParkingSlot>>;

        async fn find_slot_by_number(&self, slot_number: &str) -> StoreResult<Option<ParkingSlot>>;

        async fn list_slots_page(&self, offset: i64, limit: i64) -> StoreResult<Vec<ParkingSlot>>;

        async fn count_slots(&self) -> StoreResult<i64>;

        async fn count_free_slots(&self) -> StoreResult<i64>;

        async fn update_slot(
            &self,
            slot_number: &str,
            patch: &SlotPatch,
        ) -> StoreResult<Option<ParkingSlot>>;

        async fn delete_slot(&self, slot_number: &str) -> StoreResult<SlotDeletion>;

        async fn list_free_slots(&self) -> StoreResult<Vec<ParkingSlot>>;
    }

    #[async_trait]
    impl RequestStore for Store {
        async fn insert_request(
            &self,
            slot_id: Uuid,
            user_id: Uuid,
            created_at: DateTime<Utc>,
        ) -> StoreResult<SlotRequest>;

        async fn find_request(&self, id: Uuid) -> StoreResult<Option<SlotRequest>>;

        async fn find_request_details(&self, id: Uuid) -> StoreResult<Option<SlotRequestDetails>>;

        async fn list_request_details(
            &self,
            filter: RequestFilter,
        ) -> StoreResult<Vec<SlotRequestDetails>>;

        async fn count_requests_by_status(&self, status: RequestStatus) -> StoreResult<i64>;

        async fn commit_transition(&self, transition: &Transition) -> StoreResult<TransitionOutcome>;
    }

    #[async_trait]
    impl UserStore for Store {
        async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;

        async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

        async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

        async fn list_users(&self) -> StoreResult<Vec<User>>;
    }
}
