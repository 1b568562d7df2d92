use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of slots returned per page by the slot listing.
pub const SLOT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSlot {
    pub id: Uuid,
    pub slot_number: String,
    pub location: String,
    #[serde(rename = "type")]
    pub slot_type: String,
    pub in_use: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParkingSlot {
    pub slot_number: String,
    pub location: String,
    #[serde(rename = "type")]
    pub slot_type: String,
}

/// Partial update of a slot. Occupancy is deliberately absent: only ledger
/// transitions may change it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPatch {
    pub slot_number: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub slot_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPage {
    pub data: Vec<ParkingSlot>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotPageQuery {
    pub page: Option<i64>,
}

/// Result of a conditional slot delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDeletion {
    Deleted,
    NotFound,
    /// The slot is occupied or has PENDING/APPROVED requests; nothing was removed.
    InUse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSlotResponse {
    pub message: String,
}
