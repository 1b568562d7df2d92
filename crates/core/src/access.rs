//! # Access Policy
//!
//! The core never authenticates anyone. Callers hand it an [`Identity`] that the
//! transport layer has already verified, and every privileged operation starts
//! with one of the checks below.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ParkError, ParkResult};
use crate::models::user::Role;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// Fails with `Forbidden` unless `identity` holds `role`.
pub fn require_role(identity: &Identity, role: Role) -> ParkResult<()> {
    if identity.role == role {
        Ok(())
    } else {
        Err(ParkError::Forbidden(format!("{} role required", role)))
    }
}

/// Fails with `Forbidden` unless `caller_id` is `owner_id`.
pub fn require_owner(caller_id: Uuid, owner_id: Uuid) -> ParkResult<()> {
    if caller_id == owner_id {
        Ok(())
    } else {
        Err(ParkError::Forbidden(
            "Only the requesting user may perform this action".to_string(),
        ))
    }
}
