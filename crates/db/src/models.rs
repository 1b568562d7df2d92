use chrono::{DateTime, Utc};
use eyre::{Result, eyre};
use parkslot_core::models::{
    slot::ParkingSlot,
    slot_request::{SlotRequest, SlotRequestDetails},
    user::{User, UserSummary},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbParkingSlot {
    pub id: Uuid,
    pub slot_number: String,
    pub location: String,
    pub slot_type: String,
    pub in_use: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbParkingSlot> for ParkingSlot {
    fn from(row: DbParkingSlot) -> Self {
        ParkingSlot {
            id: row.id,
            slot_number: row.slot_number,
            location: row.location,
            slot_type: row.slot_type,
            in_use: row.in_use,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlotRequest {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_time: Option<i64>,
    pub total_charge: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbSlotRequest> for SlotRequest {
    type Error = eyre::Report;

    fn try_from(row: DbSlotRequest) -> Result<Self> {
        let status = row
            .status
            .parse()
            .map_err(|e| eyre!("Request {} has a bad status: {}", row.id, e))?;

        Ok(SlotRequest {
            id: row.id,
            slot_id: row.slot_id,
            user_id: row.user_id,
            status,
            start_time: row.start_time,
            end_time: row.end_time,
            total_time: row.total_time,
            total_charge: row.total_charge,
            created_at: row.created_at,
        })
    }
}

/// A request row joined with its slot and user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlotRequestDetails {
    #[sqlx(flatten)]
    pub request: DbSlotRequest,
    pub slot_number: String,
    pub slot_location: String,
    pub slot_type: String,
    pub slot_in_use: bool,
    pub slot_created_at: DateTime<Utc>,
    pub slot_updated_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
}

impl TryFrom<DbSlotRequestDetails> for SlotRequestDetails {
    type Error = eyre::Report;

    fn try_from(row: DbSlotRequestDetails) -> Result<Self> {
        let slot = ParkingSlot {
            id: row.request.slot_id,
            slot_number: row.slot_number,
            location: row.slot_location,
            slot_type: row.slot_type,
            in_use: row.slot_in_use,
            created_at: row.slot_created_at,
            updated_at: row.slot_updated_at,
        };
        let user = UserSummary {
            id: row.request.user_id,
            name: row.user_name,
            email: row.user_email,
        };

        Ok(SlotRequestDetails {
            request: row.request.try_into()?,
            slot,
            user,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = eyre::Report;

    fn try_from(row: DbUser) -> Result<Self> {
        let role = row
            .role
            .parse()
            .map_err(|e| eyre!("User {} has a bad role: {}", row.id, e))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}
