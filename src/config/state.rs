// Application state module
// Everything a request needs, built once at startup and never mutated

use std::sync::Arc;

use super::types::Config;
use crate::app::EntryPoint;
use crate::routing::Router;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Router,
    pub entry: Arc<dyn EntryPoint>,
}

impl AppState {
    pub fn new(config: Config, router: Router, entry: Arc<dyn EntryPoint>) -> Self {
        Self {
            config,
            router,
            entry,
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
