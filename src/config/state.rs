// Application state module
// Shared, read-only runtime state for every connection

use super::types::Config;
use crate::home::HomeRouter;

/// Application state
pub struct AppState {
    pub config: Config,
    pub home: HomeRouter,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            home: HomeRouter::from_config(&config.ai_home),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
