//! Stock location model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};

/// A warehouse or fulfilment site from the `locations` table.
///
/// `code` is the value stored in `inventory.location`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocation {
    pub code: String,
    pub name: String,
}
