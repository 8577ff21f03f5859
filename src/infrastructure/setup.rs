//! Project setup helpers
//!
//! Writes the commented default configuration template so a fresh checkout
//! can boot without hand-writing `config/config.yaml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Keel configuration
# Override settings by editing this file or by adding a local.yaml sibling
# with the same shape; local.yaml wins on conflicts.

log:
  # Console line template
  log_format: "{time} | {level} | [{tag}] {message} {fields}"

  # Log file line template
  log_format_file: "{time} | {level} | [{tag}] v{version} {message} {fields}"

  # System version label attached to every record
  version: "0.1"

  # Log level: DEBUG, INFO, WARNING, ERROR, CRITICAL
  log_level: "INFO"

  # Directory for log files
  log_dir: "./tmp/log"

  # Log file name inside log_dir
  log_file: "server.log"

  # Rotation threshold for the active file
  rotation: "100 MB"

  # Retention period for rotated files
  retention: "30 days"

  # Compression format recorded for rotated files: gz, bz2, xz, zip
  compression: "gz"
"#;

/// Write the default config template unless the file already exists
///
/// Creates parent directories as needed. Returns `true` when the template
/// was written.
pub fn ensure_default_config(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();

    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))?;

    Ok(true)
}
