//! Stock health classification for the low-stock alert feed.
//!
//! Pure logic, no database access. Alerts are never persisted: callers load
//! the current rows, and every query re-derives the buckets from the stored
//! `stock` / `threshold` pair.

use std::collections::BTreeMap;

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use crate::types::{DbId, Timestamp};

/// Health bucket of a single inventory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockLevel {
    #[serde(rename = "out-of-stock")]
    OutOfStock,
    #[serde(rename = "critical-low-stock")]
    CriticalLow,
    #[serde(rename = "low-stock")]
    Low,
    #[serde(rename = "healthy")]
    Healthy,
}

impl StockLevel {
    /// Classify a stock / threshold pair.
    ///
    /// Buckets are checked in priority order, so an empty shelf is always
    /// out-of-stock and never critical.
    pub fn classify(stock: i32, threshold: i32) -> Self {
        if stock == 0 {
            StockLevel::OutOfStock
        } else if is_critical(stock, threshold) {
            StockLevel::CriticalLow
        } else if stock <= threshold {
            StockLevel::Low
        } else {
            StockLevel::Healthy
        }
    }

    pub fn is_alert(self) -> bool {
        self != StockLevel::Healthy
    }

    /// Wire name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "out-of-stock",
            StockLevel::CriticalLow => "critical-low-stock",
            StockLevel::Low => "low-stock",
            StockLevel::Healthy => "healthy",
        }
    }
}

/// `stock <= threshold * 0.5`, evaluated exactly in integers.
///
/// For odd thresholds the boundary sits on a half: with threshold 5, stock 2
/// is critical and stock 3 is not.
pub fn is_critical(stock: i32, threshold: i32) -> bool {
    2 * i64::from(stock) <= i64::from(threshold)
}

/// Depletion ratio used to order restock candidates, most depleted first.
///
/// A zero threshold yields `0.0` for an empty shelf and infinity otherwise.
pub fn restock_ratio(stock: i32, threshold: i32) -> f64 {
    if threshold <= 0 {
        return if stock <= 0 { 0.0 } else { f64::INFINITY };
    }
    f64::from(stock) / f64::from(threshold)
}

/// Stock as a percentage of its threshold.
pub fn percent_of_threshold(stock: i32, threshold: i32) -> f64 {
    restock_ratio(stock, threshold) * 100.0
}

/// Cutoff timestamp for "not restocked in `days` days".
///
/// `None` when the window does not fit in the representable date range.
pub fn restock_cutoff(now: Timestamp, days: i64) -> Option<Timestamp> {
    Duration::try_days(days).and_then(|window| now.checked_sub_signed(window))
}

/// Read access to the fields the classifier needs.
///
/// Implemented by the persisted inventory row so the evaluator can hand the
/// original records back to callers.
pub trait StockLevels {
    fn product_id(&self) -> Uuid;
    fn location(&self) -> &str;
    fn stock(&self) -> i32;
    fn threshold(&self) -> i32;
    fn is_active(&self) -> bool;
    fn last_restocked_at(&self) -> Option<Timestamp>;

    fn level(&self) -> StockLevel {
        StockLevel::classify(self.stock(), self.threshold())
    }
}

// ---------------------------------------------------------------------------
// Threshold breaches
// ---------------------------------------------------------------------------

/// Active records split into the three mutually exclusive alert buckets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdBreaches<T> {
    pub low_stock: Vec<T>,
    pub critical_low_stock: Vec<T>,
    pub out_of_stock: Vec<T>,
}

impl<T> Default for ThresholdBreaches<T> {
    fn default() -> Self {
        Self {
            low_stock: Vec::new(),
            critical_low_stock: Vec::new(),
            out_of_stock: Vec::new(),
        }
    }
}

impl<T: StockLevels> ThresholdBreaches<T> {
    /// Classify every active item. Inactive and healthy items are dropped.
    pub fn partition(items: impl IntoIterator<Item = T>) -> Self {
        let mut breaches = Self::default();
        for item in items.into_iter().filter(|i| i.is_active()) {
            match item.level() {
                StockLevel::OutOfStock => breaches.out_of_stock.push(item),
                StockLevel::CriticalLow => breaches.critical_low_stock.push(item),
                StockLevel::Low => breaches.low_stock.push(item),
                StockLevel::Healthy => {}
            }
        }
        breaches
    }
}

impl<T> ThresholdBreaches<T> {
    pub fn total(&self) -> usize {
        self.low_stock.len() + self.critical_low_stock.len() + self.out_of_stock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Take one bucket, discarding the others.
    pub fn into_bucket(self, level: StockLevel) -> Vec<T> {
        match level {
            StockLevel::OutOfStock => self.out_of_stock,
            StockLevel::CriticalLow => self.critical_low_stock,
            StockLevel::Low => self.low_stock,
            StockLevel::Healthy => Vec::new(),
        }
    }

    /// Keep only the items matching `keep` in every bucket.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.low_stock.retain(&mut keep);
        self.critical_low_stock.retain(&mut keep);
        self.out_of_stock.retain(&mut keep);
    }

    /// Convert every item, preserving bucket membership and order.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ThresholdBreaches<U> {
        ThresholdBreaches {
            low_stock: self.low_stock.into_iter().map(&mut f).collect(),
            critical_low_stock: self.critical_low_stock.into_iter().map(&mut f).collect(),
            out_of_stock: self.out_of_stock.into_iter().map(&mut f).collect(),
        }
    }

    /// Iterate every item together with the bucket it was placed in.
    pub fn iter(&self) -> impl Iterator<Item = (StockLevel, &T)> {
        self.out_of_stock
            .iter()
            .map(|i| (StockLevel::OutOfStock, i))
            .chain(
                self.critical_low_stock
                    .iter()
                    .map(|i| (StockLevel::CriticalLow, i)),
            )
            .chain(self.low_stock.iter().map(|i| (StockLevel::Low, i)))
    }
}

// ---------------------------------------------------------------------------
// Location breakdown
// ---------------------------------------------------------------------------

/// Per-location alert counts. Each item contributes to exactly one counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCounts {
    pub low_stock_count: usize,
    pub critical_count: usize,
    pub out_of_stock_count: usize,
}

/// A [`LocationCounts`] entry tagged with its location, for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBreakdown {
    pub location: String,
    #[serde(flatten)]
    pub counts: LocationCounts,
}

/// Aggregate already-classified items into per-location counts.
pub fn group_by_location<T: StockLevels>(
    breaches: &ThresholdBreaches<T>,
) -> BTreeMap<String, LocationCounts> {
    let mut groups: BTreeMap<String, LocationCounts> = BTreeMap::new();
    for (level, item) in breaches.iter() {
        let counts = groups.entry(item.location().to_string()).or_default();
        match level {
            StockLevel::OutOfStock => counts.out_of_stock_count += 1,
            StockLevel::CriticalLow => counts.critical_count += 1,
            StockLevel::Low => counts.low_stock_count += 1,
            StockLevel::Healthy => {}
        }
    }
    groups
}

/// [`group_by_location`] flattened into a list ordered by location.
pub fn location_breakdown<T: StockLevels>(
    breaches: &ThresholdBreaches<T>,
) -> Vec<LocationBreakdown> {
    group_by_location(breaches)
        .into_iter()
        .map(|(location, counts)| LocationBreakdown { location, counts })
        .collect()
}

// ---------------------------------------------------------------------------
// Restock selection
// ---------------------------------------------------------------------------

/// Filters for [`select_for_restock`]. Empty sets mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct RestockFilter {
    pub product_ids: Vec<Uuid>,
    pub locations: Vec<String>,
    pub critical_only: bool,
}

/// Active items that need restocking, most depleted first.
///
/// Uses the critical rule when `critical_only` is set and the low-stock rule
/// otherwise. The sort is stable, so equal ratios keep their input order.
pub fn select_for_restock<T: StockLevels>(
    items: impl IntoIterator<Item = T>,
    filter: &RestockFilter,
) -> Vec<T> {
    let mut selected: Vec<T> = items
        .into_iter()
        .filter(|i| i.is_active())
        .filter(|i| filter.product_ids.is_empty() || filter.product_ids.contains(&i.product_id()))
        .filter(|i| filter.locations.is_empty() || filter.locations.iter().any(|l| l == i.location()))
        .filter(|i| {
            if filter.critical_only {
                is_critical(i.stock(), i.threshold())
            } else {
                i.stock() <= i.threshold()
            }
        })
        .collect();

    selected.sort_by(|a, b| {
        restock_ratio(a.stock(), a.threshold()).total_cmp(&restock_ratio(b.stock(), b.threshold()))
    });
    selected
}

/// Active items whose last restock is unknown or older than `cutoff`.
pub fn not_restocked_since<T: StockLevels>(
    items: impl IntoIterator<Item = T>,
    cutoff: Timestamp,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|i| i.is_active())
        .filter(|i| i.last_restocked_at().map_or(true, |at| at < cutoff))
        .collect()
}

// ---------------------------------------------------------------------------
// Alert entries
// ---------------------------------------------------------------------------

/// A classified inventory record as it appears in alert responses and
/// notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub inventory_id: DbId,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub sku: String,
    pub location: String,
    pub stock: i32,
    pub threshold: i32,
    pub level: StockLevel,
    pub is_active: bool,
    pub percent_of_threshold: f64,
    pub last_restocked_at: Option<Timestamp>,
    pub last_counted_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
