pub mod admin;
pub mod slot_requests;
pub mod slots;
