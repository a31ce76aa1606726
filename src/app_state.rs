//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::LedgerConfig;
use crate::service::LedgerService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ledger service for all business logic.
    pub service: Arc<LedgerService>,
    /// Runtime configuration.
    pub config: Arc<LedgerConfig>,
}

impl AppState {
    /// Creates the state from a service and its configuration.
    #[must_use]
    pub fn new(service: LedgerService, config: LedgerConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}
