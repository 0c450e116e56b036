//! Handlers for the low-stock alert feed.
//!
//! Every endpoint classifies the current rows on demand; nothing here reads
//! or writes alert state.

use std::collections::BTreeSet;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use stockroom_core::error::CoreError;
use stockroom_core::roles::can_manage_inventory;
use stockroom_core::stock_alert::{
    location_breakdown, restock_cutoff, LocationBreakdown, RestockFilter, StockAlert,
    ThresholdBreaches,
};
use stockroom_db::models::inventory::InventoryItem;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAlertReader;
use crate::state::AppState;

/// Look-back window for `/alerts/stale` when `days` is omitted.
const DEFAULT_STALE_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Narrowing applied to the classified feed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockQuery {
    /// Drop the plain low-stock bucket, keeping critical and out-of-stock.
    #[serde(default)]
    pub critical_only: bool,
    pub location: Option<String>,
    /// Keep only items not restocked within this many days.
    pub days_without_restock: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total_low_stock: usize,
    pub total_critical_low_stock: usize,
    pub total_out_of_stock: usize,
    pub location_breakdown: Vec<LocationBreakdown>,
}

#[derive(Debug, Serialize)]
pub struct LowStockResponse {
    #[serde(flatten)]
    pub alerts: ThresholdBreaches<StockAlert>,
    pub summary: AlertSummary,
}

/// Comma-separated filters for `/alerts/restock`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockQuery {
    pub product_ids: Option<String>,
    pub locations: Option<String>,
    #[serde(default)]
    pub critical_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct StaleQuery {
    pub days: Option<i64>,
}

/// Body for `POST /alerts/low-stock/notify`. Destinations left out fall back
/// to the configured defaults; overriding them needs inventory admin rights.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(flatten)]
    pub filter: LowStockQuery,
    pub webhook_url: Option<String>,
    pub email_recipients: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub sent: bool,
    pub alert_count: usize,
    pub location_count: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Classify the current rows and apply the feed filters.
async fn filtered_breaches(
    state: &AppState,
    query: &LowStockQuery,
) -> AppResult<ThresholdBreaches<InventoryItem>> {
    let cutoff = match query.days_without_restock {
        Some(days) if days < 0 => {
            return Err(AppError::BadRequest(
                "daysWithoutRestock must not be negative".into(),
            ))
        }
        Some(days) => Some(restock_cutoff(Utc::now(), days).ok_or_else(|| {
            AppError::BadRequest(format!("daysWithoutRestock is out of range: {days}"))
        })?),
        None => None,
    };

    let mut breaches = state.alerts.check_threshold_breaches().await?;
    if let Some(location) = &query.location {
        breaches.retain(|item| &item.location == location);
    }
    if let Some(cutoff) = cutoff {
        breaches.retain(|item| item.last_restocked_at.map_or(true, |at| at < cutoff));
    }
    if query.critical_only {
        breaches.low_stock.clear();
    }
    Ok(breaches)
}

fn to_alerts(items: Vec<InventoryItem>) -> Vec<StockAlert> {
    items.iter().map(StockAlert::from).collect()
}

fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| {
        r.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /alerts/low-stock?criticalOnly=&location=&daysWithoutRestock=
pub async fn low_stock(
    State(state): State<AppState>,
    RequireAlertReader(_user): RequireAlertReader,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<LowStockResponse>> {
    let breaches = filtered_breaches(&state, &query).await?;

    let summary = AlertSummary {
        total_low_stock: breaches.low_stock.len(),
        total_critical_low_stock: breaches.critical_low_stock.len(),
        total_out_of_stock: breaches.out_of_stock.len(),
        location_breakdown: location_breakdown(&breaches),
    };

    Ok(Json(LowStockResponse {
        alerts: breaches.map(|item| StockAlert::from(&item)),
        summary,
    }))
}

/// GET /alerts/restock?productIds=&locations=&criticalOnly=
///
/// Most depleted first.
pub async fn restock(
    State(state): State<AppState>,
    RequireAlertReader(_user): RequireAlertReader,
    Query(query): Query<RestockQuery>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let product_ids = parse_list(query.product_ids.as_deref())
        .iter()
        .map(|id| Uuid::parse_str(id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::BadRequest(format!("Invalid productIds: {e}")))?;

    let filter = RestockFilter {
        product_ids,
        locations: parse_list(query.locations.as_deref()),
        critical_only: query.critical_only,
    };
    let items = state.alerts.get_items_needing_restock(&filter).await?;
    Ok(Json(to_alerts(items)))
}

/// GET /alerts/stale?days=
pub async fn stale(
    State(state): State<AppState>,
    RequireAlertReader(_user): RequireAlertReader,
    Query(query): Query<StaleQuery>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let days = query.days.unwrap_or(DEFAULT_STALE_DAYS);
    let items = state.alerts.get_items_not_restocked_in_days(days).await?;
    Ok(Json(to_alerts(items)))
}

/// POST /alerts/low-stock/notify
///
/// Classifies, filters like the feed, and dispatches one digest per location.
pub async fn notify(
    State(state): State<AppState>,
    RequireAlertReader(user): RequireAlertReader,
    Json(request): Json<NotifyRequest>,
) -> AppResult<Json<NotifyResponse>> {
    let overrides_destinations =
        request.webhook_url.is_some() || request.email_recipients.is_some();
    if overrides_destinations && !can_manage_inventory(&user.role, &user.permissions) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Overriding notification destinations requires inventory admin".into(),
        )));
    }

    let breaches = filtered_breaches(&state, &request.filter).await?;
    let alerts: Vec<StockAlert> = breaches.iter().map(|(_, item)| StockAlert::from(item)).collect();
    let location_count = alerts
        .iter()
        .map(|a| a.location.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut options = state.config.alerts.notification_options();
    if let Some(url) = request.webhook_url {
        options.webhook_url = Some(url);
    }
    if let Some(recipients) = request.email_recipients {
        options.email_recipients = recipients;
    }

    let sent = state
        .notifier
        .send_low_stock_notifications(&alerts, &options)
        .await;
    if !sent {
        tracing::warn!(user_id = %user.user_id, "Some low stock notifications failed");
    }

    Ok(Json(NotifyResponse {
        sent,
        alert_count: alerts.len(),
        location_count,
    }))
}
