//! Admin overview: user directory, dashboard counters and admin seeding.

use tracing::info;

use crate::access::{self, Identity};
use crate::errors::ParkResult;
use crate::models::slot_request::RequestStatus;
use crate::models::user::{DashboardStats, NewUser, Role, User};
use crate::store::ParkingStore;

pub async fn list_users(store: &dyn ParkingStore, identity: &Identity) -> ParkResult<Vec<User>> {
    access::require_role(identity, Role::Admin)?;
    Ok(store.list_users().await?)
}

pub async fn dashboard_stats(
    store: &dyn ParkingStore,
    identity: &Identity,
) -> ParkResult<DashboardStats> {
    access::require_role(identity, Role::Admin)?;

    let total_slots = store.count_slots().await?;
    let available = store.count_free_slots().await?;
    let pending_requests = store
        .count_requests_by_status(RequestStatus::Pending)
        .await?;

    Ok(DashboardStats {
        total_slots,
        occupied: total_slots - available,
        available,
        pending_requests,
    })
}

/// Creates the admin account unless a user with `email` already exists.
/// Returns the existing or new user and whether it was created.
pub async fn seed_admin(
    store: &dyn ParkingStore,
    name: &str,
    email: &str,
    password_hash: &str,
) -> ParkResult<(User, bool)> {
    if let Some(existing) = store.find_user_by_email(email).await? {
        info!(user_id = %existing.id, "Admin already exists");
        return Ok((existing, false));
    }

    let admin = store
        .insert_user(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Admin,
            password_hash: Some(password_hash.to_string()),
        })
        .await?;

    info!(user_id = %admin.id, email = %admin.email, "Default admin created");
    Ok((admin, true))
}
