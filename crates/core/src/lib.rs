//! # ParkSlot Core
//!
//! Domain types and workflow rules for the parking-slot reservation service.
//!
//! - **Registry**: parking slot records and the availability query
//! - **Ledger**: the slot-request state machine and its coupling to slot occupancy
//! - **Billing**: elapsed time to charge
//! - **Access**: role and ownership checks over an already-authenticated identity
//!
//! Persistence is reached only through the traits in [`store`], so the rules here run
//! unchanged against Postgres or the in-memory store used in tests.

pub mod access;
pub mod admin;
pub mod billing;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod receipt;
pub mod registry;
pub mod store;
