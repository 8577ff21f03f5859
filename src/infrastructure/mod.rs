//! Infrastructure layer
//!
//! External integrations and adapters:
//! - Configuration loading (figment + YAML)
//! - Logging sinks, line formats, rotation
//! - Project setup helpers

pub mod config;
pub mod logging;
pub mod setup;
