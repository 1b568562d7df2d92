pub mod admin;
pub mod health;
pub mod slot_requests;
pub mod slots;
