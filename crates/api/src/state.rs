use std::sync::Arc;

use panels_db::LibraryPanelService;

use crate::config::ServerConfig;

/// Shared handler state. Cloning is cheap: the service wraps the pool.
#[derive(Clone)]
pub struct AppState {
    pub panels: LibraryPanelService,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(panels: LibraryPanelService, config: ServerConfig) -> Self {
        Self {
            panels,
            config: Arc::new(config),
        }
    }
}
