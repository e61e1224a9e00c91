//! Shared types, errors and pure domain rules for the order status service.
//!
//! Nothing in this crate performs I/O; the database and delivery crates
//! build on these rules.

pub mod email;
pub mod error;
pub mod order_status;
pub mod types;
