//! Pure domain logic for the stockroom inventory service.
//!
//! Nothing in this crate performs I/O. The database and HTTP crates fetch
//! rows, hand them to these functions and persist or render the results.

pub mod error;
pub mod inventory;
pub mod roles;
pub mod sku;
pub mod stock_alert;
pub mod types;
