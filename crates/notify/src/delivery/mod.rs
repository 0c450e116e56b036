//! Concrete [`AlertChannel`](crate::channel::AlertChannel) implementations.

pub mod email;
pub mod log;
pub mod webhook;
