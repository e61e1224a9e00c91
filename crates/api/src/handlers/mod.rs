pub mod order_statuses;
pub mod orders;
