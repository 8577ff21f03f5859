use std::path::PathBuf;
use std::sync::Arc;

use crate::infrastructure::config::{ConfigLoader, DEFAULT_CONFIG_PATH};
use crate::infrastructure::logging::{LoggerManager, TaggedLogger};

/// Process-wide configuration and logging context
///
/// Construct one at process start and pass it (or handles derived from it)
/// where needed. Replaces hidden singleton accessors: everything the
/// application shares is reachable from this one value.
pub struct AppContext {
    config_loader: Arc<ConfigLoader>,
    logger_manager: LoggerManager,
}

impl AppContext {
    /// Context over an explicit configuration file path
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_loader = Arc::new(ConfigLoader::new(config_path));
        let logger_manager = LoggerManager::new(Arc::clone(&config_loader));
        Self {
            config_loader,
            logger_manager,
        }
    }

    /// Context over the fixed project-local config path
    pub fn project_local() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }

    /// Shared configuration loader
    pub fn config_loader(&self) -> &Arc<ConfigLoader> {
        &self.config_loader
    }

    /// Logger manager owning the sink stack
    pub fn logger_manager(&self) -> &LoggerManager {
        &self.logger_manager
    }

    /// Tag-bound logger handle, initializing sinks on first use
    pub fn get_logger(&self, tag: &str) -> TaggedLogger {
        self.logger_manager.get_logger(tag)
    }

    /// Tear down sinks for test isolation
    pub fn reset_logger(&self) {
        self.logger_manager.reset_logger();
    }
}
