//! Domain models

pub mod config;

pub use config::{Config, LogConfig, VALID_COMPRESSION_FORMATS, VALID_LOG_LEVELS};
