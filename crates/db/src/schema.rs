use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            role VARCHAR(16) NOT NULL DEFAULT 'USER',
            password_hash VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_role CHECK (role IN ('ADMIN', 'USER'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create parking_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS parking_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            slot_number VARCHAR(64) NOT NULL,
            location VARCHAR(255) NOT NULL,
            slot_type VARCHAR(64) NOT NULL,
            in_use BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT parking_slots_slot_number_key UNIQUE (slot_number)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create slot_requests table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slot_requests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            slot_id UUID NOT NULL REFERENCES parking_slots(id) ON DELETE CASCADE,
            user_id UUID NOT NULL REFERENCES users(id),
            status VARCHAR(16) NOT NULL DEFAULT 'PENDING',
            start_time TIMESTAMP WITH TIME ZONE NULL,
            end_time TIMESTAMP WITH TIME ZONE NULL,
            total_time BIGINT NULL,
            total_charge DOUBLE PRECISION NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('PENDING', 'APPROVED', 'REJECTED', 'COMPLETED')),
            CONSTRAINT started_when_active CHECK (
                (status IN ('APPROVED', 'COMPLETED')) = (start_time IS NOT NULL)
            ),
            CONSTRAINT billed_when_completed CHECK (
                (status = 'COMPLETED') = (end_time IS NOT NULL AND total_time IS NOT NULL AND total_charge IS NOT NULL)
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_parking_slots_in_use ON parking_slots(in_use);
        CREATE INDEX IF NOT EXISTS idx_parking_slots_created_at ON parking_slots(created_at);
        CREATE INDEX IF NOT EXISTS idx_slot_requests_slot_id ON slot_requests(slot_id);
        CREATE INDEX IF NOT EXISTS idx_slot_requests_user_id ON slot_requests(user_id);
        CREATE INDEX IF NOT EXISTS idx_slot_requests_status ON slot_requests(status);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_slot_requests_one_approved_per_slot
            ON slot_requests(slot_id) WHERE status = 'APPROVED';
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
