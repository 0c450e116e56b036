pub mod alerts;
pub mod health;
pub mod inventory;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /inventory/{sku}                 get by SKU (?location=), update by SKU (PUT, auth)
/// /inventory/id/{id}               get by id
/// /inventory                       create (POST, auth)
/// /inventory/bulk-sync             bulk create/update (POST, auth)
///
/// /alerts/low-stock                classified feed (alert reader)
/// /alerts/low-stock/notify         dispatch notifications (POST, alert reader)
/// /alerts/restock                  restock candidates, most depleted first
/// /alerts/stale                    items not restocked within `days`
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/alerts", alerts::router())
}
