//! Route definitions for the `/inventory` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::inventory;
use crate::state::AppState;

/// Routes mounted at `/inventory`.
///
/// Reads are public; writes require a valid token (enforced by extractors).
///
/// ```text
/// POST /                 -> create
/// POST /bulk-sync        -> bulk_sync
/// GET  /id/{id}          -> get_by_id
/// GET  /{sku}            -> get_by_sku
/// PUT  /{sku}            -> update_by_sku
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(inventory::create))
        .route("/bulk-sync", post(inventory::bulk_sync))
        .route("/id/{id}", get(inventory::get_by_id))
        .route(
            "/{sku}",
            get(inventory::get_by_sku).put(inventory::update_by_sku),
        )
}
