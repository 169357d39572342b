use std::sync::Arc;

use reardiff_core::{
    Config, DownloadClient, Library, RecordStore, RejectionOrchestrator, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn RecordStore>,
    orchestrator: RejectionOrchestrator,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn RecordStore>,
        downloader: Arc<dyn DownloadClient>,
        library: Arc<dyn Library>,
    ) -> Self {
        let orchestrator = RejectionOrchestrator::new(Arc::clone(&store), downloader, library);
        Self {
            config,
            store,
            orchestrator,
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn orchestrator(&self) -> &RejectionOrchestrator {
        &self.orchestrator
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }
}
