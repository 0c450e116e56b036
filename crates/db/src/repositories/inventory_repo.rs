//! Repository for the `inventory` table.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::inventory::{
    InventoryFilter, InventoryItem, NewInventoryItem, UpdateInventoryItem,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, product_id, variant_id, sku, stock, location, threshold, \
    is_low_stock, is_active, metadata, last_restocked_at, last_counted_at, \
    created_at, updated_at";

/// Provides query operations for inventory records.
pub struct InventoryRepo;

impl InventoryRepo {
    /// Insert a resolved inventory row, returning the created record.
    ///
    /// A duplicate `(sku, location)` fails on `uq_inventory_sku_location`.
    pub async fn create(
        pool: &PgPool,
        input: &NewInventoryItem,
    ) -> Result<InventoryItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO inventory \
                (product_id, variant_id, sku, stock, location, threshold, is_low_stock, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(input.product_id)
            .bind(input.variant_id)
            .bind(&input.sku)
            .bind(input.stock)
            .bind(&input.location)
            .bind(input.threshold)
            .bind(input.is_low_stock)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Find a record by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<InventoryItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inventory WHERE id = $1");
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All records for a SKU, optionally narrowed to one location.
    pub async fn find_by_sku(
        pool: &PgPool,
        sku: &str,
        location: Option<&str>,
    ) -> Result<Vec<InventoryItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inventory \
             WHERE sku = $1 AND ($2::TEXT IS NULL OR location = $2) \
             ORDER BY location"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(sku)
            .bind(location)
            .fetch_all(pool)
            .await
    }

    /// Patch a record. Only non-`None` fields in `input` are applied.
    ///
    /// `is_low_stock` is recomputed in the same statement from the resulting
    /// stock and threshold. Supplying `stock` stamps `last_counted_at`; a stock
    /// increase also stamps `last_restocked_at`. Right-hand expressions see the
    /// pre-update row.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, sqlx::Error> {
        let query = format!(
            "UPDATE inventory SET \
                last_restocked_at = CASE WHEN $2::INTEGER > stock THEN NOW() ELSE last_restocked_at END, \
                last_counted_at = CASE WHEN $2::INTEGER IS NOT NULL THEN NOW() ELSE last_counted_at END, \
                stock = COALESCE($2, stock), \
                threshold = COALESCE($3, threshold), \
                is_low_stock = COALESCE($2, stock) <= COALESCE($3, threshold), \
                is_active = COALESCE($4, is_active), \
                metadata = COALESCE($5, metadata), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(id)
            .bind(input.stock)
            .bind(input.threshold)
            .bind(input.is_active)
            .bind(&input.metadata)
            .fetch_optional(pool)
            .await
    }

    /// Active records, optionally narrowed to product ids and locations.
    ///
    /// Empty filter sets match everything. Ordered by id so downstream stable
    /// sorts are deterministic.
    pub async fn list_active(
        pool: &PgPool,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inventory \
             WHERE is_active = TRUE \
               AND (cardinality($1::UUID[]) = 0 OR product_id = ANY($1)) \
               AND (cardinality($2::TEXT[]) = 0 OR location = ANY($2)) \
             ORDER BY id"
        );
        sqlx::query_as::<_, InventoryItem>(&query)
            .bind(&filter.product_ids)
            .bind(&filter.locations)
            .fetch_all(pool)
            .await
    }
}
