use crate::models::DbParkingSlot;
use chrono::Utc;
use eyre::Result;
use parkslot_core::models::slot::{NewParkingSlot, SlotDeletion, SlotPatch};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

const SLOT_COLUMNS: &str = "id, slot_number, location, slot_type, in_use, created_at, updated_at";

pub async fn create_slot(pool: &Pool<Postgres>, slot: &NewParkingSlot) -> Result<DbParkingSlot> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating parking slot: id={}, slot_number={}", id, slot.slot_number);

    let created = sqlx::query_as::<_, DbParkingSlot>(&format!(
        r#"
        INSERT INTO parking_slots (id, slot_number, location, slot_type, in_use, created_at, updated_at)
        VALUES ($1, $2, $3, $4, FALSE, $5, $5)
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&slot.slot_number)
    .bind(&slot.location)
    .bind(&slot.slot_type)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_slot_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbParkingSlot>> {
    let slot = sqlx::query_as::<_, DbParkingSlot>(&format!(
        "SELECT {SLOT_COLUMNS} FROM parking_slots WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn get_slot_by_number(
    pool: &Pool<Postgres>,
    slot_number: &str,
) -> Result<Option<DbParkingSlot>> {
    let slot = sqlx::query_as::<_, DbParkingSlot>(&format!(
        "SELECT {SLOT_COLUMNS} FROM parking_slots WHERE slot_number = $1"
    ))
    .bind(slot_number)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn list_slots(
    pool: &Pool<Postgres>,
    offset: i64,
    limit: i64,
) -> Result<Vec<DbParkingSlot>> {
    let slots = sqlx::query_as::<_, DbParkingSlot>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM parking_slots
        ORDER BY id ASC
        OFFSET $1
        LIMIT $2
        "#
    ))
    .bind(offset)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

pub async fn count_slots(pool: &Pool<Postgres>) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parking_slots")
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub async fn count_free_slots(pool: &Pool<Postgres>) -> Result<i64> {
    let free = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parking_slots WHERE NOT in_use")
        .fetch_one(pool)
        .await?;

    Ok(free)
}

pub async fn update_slot(
    pool: &Pool<Postgres>,
    slot_number: &str,
    patch: &SlotPatch,
) -> Result<Option<DbParkingSlot>> {
    let updated = sqlx::query_as::<_, DbParkingSlot>(&format!(
        r#"
        UPDATE parking_slots
        SET slot_number = COALESCE($2, slot_number),
            location = COALESCE($3, location),
            slot_type = COALESCE($4, slot_type),
            updated_at = $5
        WHERE slot_number = $1
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(slot_number)
    .bind(patch.slot_number.as_deref())
    .bind(patch.location.as_deref())
    .bind(patch.slot_type.as_deref())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

/// Deletes the slot unless it is occupied or has PENDING/APPROVED requests.
///
/// The slot row is locked before the requests are counted. Filing a request
/// takes a key-share lock on the slot through the foreign key, so a request
/// committed before the lock is seen by the count and one filed after it
/// waits and then fails on the missing slot.
pub async fn delete_slot(pool: &Pool<Postgres>, slot_number: &str) -> Result<SlotDeletion> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_as::<_, (Uuid, bool)>(
        "SELECT id, in_use FROM parking_slots WHERE slot_number = $1 FOR UPDATE",
    )
    .bind(slot_number)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((slot_id, in_use)) = locked else {
        tx.rollback().await?;
        return Ok(SlotDeletion::NotFound);
    };

    let active = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM slot_requests
        WHERE slot_id = $1 AND status IN ('PENDING', 'APPROVED')
        "#,
    )
    .bind(slot_id)
    .fetch_one(&mut *tx)
    .await?;

    if in_use || active > 0 {
        tx.rollback().await?;
        return Ok(SlotDeletion::InUse);
    }

    sqlx::query("DELETE FROM parking_slots WHERE id = $1")
        .bind(slot_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::debug!("Slot deleted: id={}, slot_number={}", slot_id, slot_number);
    Ok(SlotDeletion::Deleted)
}

pub async fn list_free_slots(pool: &Pool<Postgres>) -> Result<Vec<DbParkingSlot>> {
    let slots = sqlx::query_as::<_, DbParkingSlot>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM parking_slots
        WHERE NOT in_use
        ORDER BY created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

/// Check-and-set of the occupancy flag inside `tx`. Returns whether the flag
/// changed; `false` means it already had `in_use`.
///
/// Concurrent callers serialize on the row lock, and the loser re-evaluates
/// the predicate against the committed value.
pub async fn set_in_use(
    tx: &mut Transaction<'_, Postgres>,
    slot_id: Uuid,
    in_use: bool,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE parking_slots
        SET in_use = $2, updated_at = $3
        WHERE id = $1 AND in_use <> $2
        "#,
    )
    .bind(slot_id)
    .bind(in_use)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}
