//! Keel - configuration and logging foundation
//!
//! Keel loads a validated YAML configuration document and hands out
//! tag-bound structured loggers backed by a console sink and a rotating
//! file sink.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): configuration records and validation rules
//! - **Application Layer** (`application`): the explicitly threaded context
//! - **Infrastructure Layer** (`infrastructure`): figment-backed loading,
//!   tracing sink management, rotation, setup helpers
//!
//! # Example
//!
//! ```ignore
//! use keel::AppContext;
//!
//! fn main() {
//!     let context = AppContext::project_local();
//!     let log = context.get_logger("MAIN");
//!     log.info("server starting");
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::AppContext;
pub use domain::models::{Config, LogConfig};
pub use infrastructure::config::{ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH};
pub use infrastructure::logging::{
    BaseLogger, LogRotator, LoggerManager, LoggerStatus, TaggedLogger, DEFAULT_TAG,
};
