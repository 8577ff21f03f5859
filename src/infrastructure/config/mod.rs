//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading with a `local.yaml` override sibling
//! - Validation with aggregated violation reporting
//! - A lazily populated, validated cache

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, DEFAULT_CONFIG_PATH};
