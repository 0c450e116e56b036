//! Inventory record invariants.
//!
//! Every create and update path runs its input through these checks before
//! touching storage, and derives `is_low_stock` with [`is_low_stock`].

use crate::error::CoreError;

/// Threshold applied when a create request omits one.
pub const DEFAULT_THRESHOLD: i32 = 5;

/// Maximum SKU length in characters.
pub const MAX_SKU_LEN: usize = 20;

/// Maximum location identifier length in characters.
pub const MAX_LOCATION_LEN: usize = 100;

/// `true` when stock is at or below the restock threshold.
pub fn is_low_stock(stock: i32, threshold: i32) -> bool {
    stock <= threshold
}

/// Reject a negative stock quantity.
pub fn validate_stock(stock: i32) -> Result<(), CoreError> {
    if stock < 0 {
        return Err(CoreError::Validation(format!(
            "stock must not be negative, got {stock}"
        )));
    }
    Ok(())
}

/// Reject a negative threshold.
pub fn validate_threshold(threshold: i32) -> Result<(), CoreError> {
    if threshold < 0 {
        return Err(CoreError::Validation(format!(
            "threshold must not be negative, got {threshold}"
        )));
    }
    Ok(())
}

/// SKUs are 1-20 characters. Caller-supplied SKUs are not required to match
/// the generated `P{hex}` format.
pub fn validate_sku(sku: &str) -> Result<(), CoreError> {
    let len = sku.chars().count();
    if len == 0 || len > MAX_SKU_LEN {
        return Err(CoreError::Validation(format!(
            "sku must be between 1 and {MAX_SKU_LEN} characters"
        )));
    }
    Ok(())
}

/// Locations are non-blank and at most 100 characters.
pub fn validate_location(location: &str) -> Result<(), CoreError> {
    if location.trim().is_empty() {
        return Err(CoreError::Validation("location is required".to_string()));
    }
    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(CoreError::Validation(format!(
            "location must be at most {MAX_LOCATION_LEN} characters"
        )));
    }
    Ok(())
}

/// Metadata must be a JSON object when present.
pub fn validate_metadata(metadata: &serde_json::Value) -> Result<(), CoreError> {
    if !metadata.is_object() {
        return Err(CoreError::Validation(
            "metadata must be a JSON object".to_string(),
        ));
    }
    Ok(())
}
