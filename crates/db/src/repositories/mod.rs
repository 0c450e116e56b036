//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod inventory_repo;
pub mod location_repo;

pub use inventory_repo::InventoryRepo;
pub use location_repo::LocationRepo;
