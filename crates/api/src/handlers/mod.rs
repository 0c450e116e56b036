pub mod alerts;
pub mod inventory;
