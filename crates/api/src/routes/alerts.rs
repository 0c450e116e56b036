//! Route definitions for the low-stock alert feed.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`. All require an alert reader.
///
/// ```text
/// GET  /low-stock          -> low_stock
/// POST /low-stock/notify   -> notify
/// GET  /restock            -> restock
/// GET  /stale              -> stale
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(alerts::low_stock))
        .route("/low-stock/notify", post(alerts::notify))
        .route("/restock", get(alerts::restock))
        .route("/stale", get(alerts::stale))
}
