//! SKU codec.
//!
//! Generated SKUs have the shape `P{6 hex}` for a base product and
//! `P{6 hex}-V{4 hex}` for a variant, where each hex run is the uppercased
//! prefix of a SHA-256 digest of the entity id. The product segment only has
//! 24 bits of space, so collisions are possible; uniqueness is enforced by the
//! `(sku, location)` constraint on the inventory table, not here.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Number of hex characters taken from the product digest.
const PRODUCT_HASH_LEN: usize = 6;

/// Number of hex characters taken from the variant digest.
const VARIANT_HASH_LEN: usize = 4;

static SKU_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P([A-F0-9]{6})(?:-V([A-F0-9]{4}))?$").expect("valid regex")
});

/// Uppercased leading hex characters of the SHA-256 digest of `id`.
fn digest_prefix(id: &Uuid, len: usize) -> String {
    let hash = Sha256::digest(id.to_string().as_bytes());
    let mut hex = format!("{hash:x}");
    hex.truncate(len);
    hex.to_ascii_uppercase()
}

/// Generate a SKU for a product and optional variant.
///
/// Deterministic: the same ids always yield the same SKU.
///
/// ```
/// use stockroom_core::sku::{generate, has_variant, validate};
/// use uuid::Uuid;
///
/// let product = Uuid::new_v4();
/// let sku = generate(&product, None);
/// assert!(validate(&sku));
/// assert!(!has_variant(&sku));
/// ```
pub fn generate(product_id: &Uuid, variant_id: Option<&Uuid>) -> String {
    let mut sku = format!("P{}", digest_prefix(product_id, PRODUCT_HASH_LEN));
    if let Some(variant_id) = variant_id {
        sku.push_str("-V");
        sku.push_str(&digest_prefix(variant_id, VARIANT_HASH_LEN));
    }
    sku
}

/// Whether `sku` is in the generated format.
pub fn validate(sku: &str) -> bool {
    SKU_RE.is_match(sku)
}

/// The 6-character product segment, or `None` if `sku` is not valid.
pub fn extract_product_hash(sku: &str) -> Option<&str> {
    SKU_RE
        .captures(sku)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The 4-character variant segment, or `None` if absent or `sku` is not valid.
pub fn extract_variant_hash(sku: &str) -> Option<&str> {
    SKU_RE
        .captures(sku)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Whether `sku` is valid and carries a variant segment.
pub fn has_variant(sku: &str) -> bool {
    extract_variant_hash(sku).is_some()
}
