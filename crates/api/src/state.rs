use std::sync::Arc;

use stockroom_db::{AlertEvaluator, InventoryRepository, InventoryStore};
use stockroom_notify::LowStockNotifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every component sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Storage backend shared by the store and the evaluator.
    pub repo: Arc<dyn InventoryRepository>,
    pub store: Arc<InventoryStore>,
    pub alerts: Arc<AlertEvaluator>,
    pub notifier: Arc<LowStockNotifier>,
}

impl AppState {
    /// Wire the store and evaluator over one repository.
    pub fn new(
        config: ServerConfig,
        repo: Arc<dyn InventoryRepository>,
        notifier: LowStockNotifier,
    ) -> Self {
        let store = InventoryStore::new(Arc::clone(&repo), config.inventory);
        let alerts = AlertEvaluator::new(Arc::clone(&repo));
        Self {
            config: Arc::new(config),
            repo,
            store: Arc::new(store),
            alerts: Arc::new(alerts),
            notifier: Arc::new(notifier),
        }
    }
}
