//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod email_repo;
pub mod order_repo;
pub mod order_status_repo;

pub use email_repo::EmailRepo;
pub use order_repo::OrderRepo;
pub use order_status_repo::OrderStatusRepo;
