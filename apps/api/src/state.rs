use std::sync::Arc;

use crate::config::Config;
use crate::listings::orchestrator::ListingsOrchestrator;
use crate::listings::preferences::PreferenceStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The cache-and-fetch core behind the listings endpoints.
    pub listings: Arc<ListingsOrchestrator>,
    /// Written by the résumé pipeline, read by the orchestrator.
    pub prefs: Arc<dyn PreferenceStore>,
    pub config: Config,
}
