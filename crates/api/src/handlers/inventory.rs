//! Handlers for the `/inventory` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockroom_core::types::DbId;
use stockroom_db::models::inventory::{
    BulkSyncItem, BulkSyncOptions, BulkSyncReport, CreateInventoryItem, InventoryItem,
    UpdateInventoryItem,
};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Optional `?location=` narrowing for SKU-addressed routes.
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// Records touched by an SKU-addressed update.
#[derive(Debug, Serialize)]
pub struct UpdateBySkuResponse {
    pub updated: usize,
    pub items: Vec<InventoryItem>,
}

/// Request body for `POST /inventory/bulk-sync`.
#[derive(Debug, Deserialize)]
pub struct BulkSyncRequest {
    pub items: Vec<BulkSyncItem>,
    #[serde(default)]
    pub options: BulkSyncOptions,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /inventory/{sku}?location=
pub async fn get_by_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let items = state
        .store
        .get_by_sku(&sku, query.location.as_deref())
        .await?;
    Ok(Json(items))
}

/// GET /inventory/id/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<InventoryItem>> {
    Ok(Json(state.store.get_by_id(id).await?))
}

/// POST /inventory
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateInventoryItem>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    let item = state.store.create(&input).await?;
    tracing::debug!(user_id = %user.user_id, id = item.id, "Inventory created via API");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /inventory/{sku}?location=
///
/// Applies the patch to every record of the SKU, or to the one at `location`.
pub async fn update_by_sku(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(sku): Path<String>,
    Query(query): Query<LocationQuery>,
    Json(patch): Json<UpdateInventoryItem>,
) -> AppResult<Json<UpdateBySkuResponse>> {
    let items = state
        .store
        .update_by_sku(&sku, query.location.as_deref(), &patch)
        .await?;
    Ok(Json(UpdateBySkuResponse {
        updated: items.len(),
        items,
    }))
}

/// POST /inventory/bulk-sync
///
/// Always 200: per-item failures are reported in the body.
pub async fn bulk_sync(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<BulkSyncRequest>,
) -> AppResult<Json<BulkSyncReport>> {
    tracing::info!(
        user_id = %user.user_id,
        items = request.items.len(),
        "Bulk sync requested"
    );
    let report = state.store.bulk_sync(&request.items, request.options).await;
    Ok(Json(report))
}
