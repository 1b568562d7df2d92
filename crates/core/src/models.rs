pub mod slot;
pub mod slot_request;
pub mod user;
