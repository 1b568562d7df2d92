#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name},
};
use parkslot_core::{
    access::Identity,
    models::{
        slot::{NewParkingSlot, ParkingSlot},
        user::{NewUser, Role, User},
    },
    registry,
    store::{UserStore, memory::MemoryStore},
};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
}

pub fn new_slot(number: &str) -> NewParkingSlot {
    NewParkingSlot {
        slot_number: number.to_string(),
        location: "Level 1".to_string(),
        slot_type: "COMPACT".to_string(),
    }
}

pub async fn add_user(store: &MemoryStore, role: Role) -> User {
    store
        .insert_user(&NewUser {
            name: Name().fake(),
            email: SafeEmail().fake(),
            role,
            password_hash: None,
        })
        .await
        .expect("Failed to insert user")
}

pub async fn add_slot(store: &MemoryStore, number: &str) -> ParkingSlot {
    registry::create_slot(store, new_slot(number))
        .await
        .expect("Failed to create slot")
}

pub fn identity(user: &User) -> Identity {
    Identity::new(user.id, user.role)
}
