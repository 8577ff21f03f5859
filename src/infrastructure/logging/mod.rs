//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Template-driven console and file sinks
//! - Tag- and version-bound handles
//! - Size-based rotation and retention cleanup

pub mod format;
pub mod manager;
pub mod rotation;

pub use format::{LineTemplate, TemplateError};
pub use manager::{
    BaseLogger, LoggerInitError, LoggerManager, LoggerStatus, TaggedLogger, DEFAULT_TAG,
};
pub use rotation::LogRotator;

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
