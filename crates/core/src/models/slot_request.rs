use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ParkError;
use crate::models::{slot::ParkingSlot, user::UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Completed => "COMPLETED",
        }
    }

    /// REJECTED and COMPLETED never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Completed)
    }

    /// Whether the state machine has an edge from `self` to `next`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Completed)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "COMPLETED" => Ok(RequestStatus::Completed),
            other => Err(ParkError::InvalidState(format!(
                "Unknown request status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub user_id: Uuid,
    pub status: RequestStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Billed minutes, rounded up.
    pub total_time: Option<i64>,
    pub total_charge: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A request joined with its slot and requesting user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequestDetails {
    #[serde(flatten)]
    pub request: SlotRequest,
    pub slot: ParkingSlot,
    pub user: UserSummary,
}

/// Which requests a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFilter {
    User(Uuid),
    Status(RequestStatus),
    All,
}

/// One logical write touching both a request and, where needed, its slot.
///
/// Stores apply a transition as a single unit of work: the request status is
/// compared-and-set against the expected source state and the slot flag is
/// checked-and-set, or nothing is written at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Approve {
        request_id: Uuid,
        slot_id: Uuid,
        start_time: DateTime<Utc>,
    },
    Reject {
        request_id: Uuid,
    },
    Complete {
        request_id: Uuid,
        slot_id: Uuid,
        end_time: DateTime<Utc>,
        total_time: i64,
        total_charge: f64,
    },
}

impl Transition {
    pub fn request_id(&self) -> Uuid {
        match self {
            Transition::Approve { request_id, .. }
            | Transition::Reject { request_id }
            | Transition::Complete { request_id, .. } => *request_id,
        }
    }

    /// Status the request must currently have for the transition to apply.
    pub fn expected_status(&self) -> RequestStatus {
        match self {
            Transition::Approve { .. } | Transition::Reject { .. } => RequestStatus::Pending,
            Transition::Complete { .. } => RequestStatus::Approved,
        }
    }

    pub fn target_status(&self) -> RequestStatus {
        match self {
            Transition::Approve { .. } => RequestStatus::Approved,
            Transition::Reject { .. } => RequestStatus::Rejected,
            Transition::Complete { .. } => RequestStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Both records were written.
    Applied(SlotRequest),
    /// The request was no longer in the expected status.
    StaleStatus,
    /// The slot lock was already held by another session.
    SlotHeld,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotRequestBody {
    pub slot_id: Uuid,
}
