use std::sync::Arc;

use crate::collab::{CollabSettings, Coordinator};
use crate::db::CollabStore;
use crate::engine::DocHub;

/// Shared handles injected into every route
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub hub: Arc<DocHub>,
}

impl AppState {
    pub fn new(store: Arc<dyn CollabStore>, settings: CollabSettings) -> Self {
        let coordinator = Arc::new(Coordinator::new(store, settings));
        let hub = Arc::new(DocHub::new(coordinator.clone()));
        Self { coordinator, hub }
    }
}
