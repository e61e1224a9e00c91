//! Services layered over the repositories.

pub mod order_status_cache;
pub mod order_status_service;

pub use order_status_service::{
    DefaultStatusContext, DefaultStatusOverride, OrderStatusError, OrderStatusService,
};
