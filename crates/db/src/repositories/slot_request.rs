use crate::models::{DbSlotRequest, DbSlotRequestDetails};
use crate::repositories::slot;
use chrono::{DateTime, Utc};
use eyre::Result;
use parkslot_core::models::slot_request::{RequestFilter, RequestStatus, Transition};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

const REQUEST_COLUMNS: &str =
    "id, slot_id, user_id, status, start_time, end_time, total_time, total_charge, created_at";

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.slot_id, r.user_id, r.status, r.start_time, r.end_time,
           r.total_time, r.total_charge, r.created_at,
           s.slot_number, s.location AS slot_location, s.slot_type,
           s.in_use AS slot_in_use, s.created_at AS slot_created_at,
           s.updated_at AS slot_updated_at,
           u.name AS user_name, u.email AS user_email
    FROM slot_requests r
    JOIN parking_slots s ON s.id = r.slot_id
    JOIN users u ON u.id = r.user_id
"#;

/// What a transition wrote, before the slot side is settled.
pub enum TransitionWrite {
    Applied(DbSlotRequest),
    StaleStatus,
    SlotHeld,
}

pub async fn create_request(
    pool: &Pool<Postgres>,
    slot_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
) -> Result<DbSlotRequest> {
    let id = Uuid::new_v4();

    let request = sqlx::query_as::<_, DbSlotRequest>(&format!(
        r#"
        INSERT INTO slot_requests (id, slot_id, user_id, status, created_at)
        VALUES ($1, $2, $3, 'PENDING', $4)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(slot_id)
    .bind(user_id)
    .bind(created_at)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Slot request created: id={}, slot_id={}", id, slot_id);
    Ok(request)
}

pub async fn get_request_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbSlotRequest>> {
    let request = sqlx::query_as::<_, DbSlotRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM slot_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(request)
}

pub async fn get_request_details(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbSlotRequestDetails>> {
    let details = sqlx::query_as::<_, DbSlotRequestDetails>(&format!(
        "{DETAILS_SELECT} WHERE r.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(details)
}

pub async fn list_request_details(
    pool: &Pool<Postgres>,
    filter: RequestFilter,
) -> Result<Vec<DbSlotRequestDetails>> {
    let order = "ORDER BY r.created_at DESC, r.id DESC";

    let rows = match filter {
        RequestFilter::User(user_id) => {
            sqlx::query_as::<_, DbSlotRequestDetails>(&format!(
                "{DETAILS_SELECT} WHERE r.user_id = $1 {order}"
            ))
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        RequestFilter::Status(status) => {
            sqlx::query_as::<_, DbSlotRequestDetails>(&format!(
                "{DETAILS_SELECT} WHERE r.status = $1 {order}"
            ))
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        RequestFilter::All => {
            sqlx::query_as::<_, DbSlotRequestDetails>(&format!("{DETAILS_SELECT} {order}"))
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

pub async fn count_requests_by_status(pool: &Pool<Postgres>, status: RequestStatus) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM slot_requests WHERE status = $1")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Moves a request from the transition's expected status to its target.
/// Returns `None` if the request was not in the expected status.
async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    transition: &Transition,
) -> Result<Option<DbSlotRequest>> {
    let (start_time, end_time, total_time, total_charge) = match transition {
        Transition::Approve { start_time, .. } => (Some(*start_time), None, None, None),
        Transition::Reject { .. } => (None, None, None, None),
        Transition::Complete {
            end_time,
            total_time,
            total_charge,
            ..
        } => (None, Some(*end_time), Some(*total_time), Some(*total_charge)),
    };

    let updated = sqlx::query_as::<_, DbSlotRequest>(&format!(
        r#"
        UPDATE slot_requests
        SET status = $3,
            start_time = COALESCE($4, start_time),
            end_time = COALESCE($5, end_time),
            total_time = COALESCE($6, total_time),
            total_charge = COALESCE($7, total_charge)
        WHERE id = $1 AND status = $2
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(transition.request_id())
    .bind(transition.expected_status().as_str())
    .bind(transition.target_status().as_str())
    .bind(start_time)
    .bind(end_time)
    .bind(total_time)
    .bind(total_charge)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(updated)
}

/// Applies `transition` in a single database transaction. Nothing is written
/// unless every step succeeds.
pub async fn commit_transition(
    pool: &Pool<Postgres>,
    transition: &Transition,
) -> Result<TransitionWrite> {
    let mut tx = pool.begin().await?;

    // Take the slot lock before touching the request so competing approvals
    // queue on the slot row rather than on the one-approved-per-slot index.
    match transition {
        Transition::Approve { slot_id, .. } => {
            if !slot::set_in_use(&mut tx, *slot_id, true).await? {
                tx.rollback().await?;
                return Ok(TransitionWrite::SlotHeld);
            }
        }
        Transition::Complete { slot_id, .. } => {
            if !slot::set_in_use(&mut tx, *slot_id, false).await? {
                tracing::warn!("Completed session on slot {} that was not occupied", slot_id);
            }
        }
        Transition::Reject { .. } => {}
    }

    let Some(updated) = update_status(&mut tx, transition).await? else {
        tx.rollback().await?;
        return Ok(TransitionWrite::StaleStatus);
    };

    tx.commit().await?;
    tracing::debug!(
        "Transition committed: request_id={}, status={}",
        updated.id,
        updated.status
    );
    Ok(TransitionWrite::Applied(updated))
}
