use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Log levels accepted by validation, canonical casing
pub const VALID_LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

/// Compression formats accepted for rotated files, canonical casing
pub const VALID_COMPRESSION_FORMATS: [&str; 4] = ["gz", "bz2", "xz", "zip"];

/// Logging configuration (`log:` section of the config document)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LogConfig {
    /// Console line template. Required: empty fails validation
    #[serde(default)]
    pub log_format: String,

    /// Log file line template. Required: empty fails validation
    #[serde(default)]
    pub log_format_file: String,

    /// Version label bound to every emitted record
    #[serde(default = "default_version")]
    pub version: String,

    /// Log level: DEBUG, INFO, WARNING, ERROR, CRITICAL
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory log files are written to
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Log file name inside `log_dir`
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Rotation threshold for the active file, e.g. "100 MB"
    #[serde(default = "default_rotation")]
    pub rotation: String,

    /// Retention period for rotated files, e.g. "30 days"
    #[serde(default = "default_retention")]
    pub retention: String,

    /// Compression format recorded for rotated files: gz, bz2, xz, zip
    #[serde(default = "default_compression")]
    pub compression: String,
}

fn default_version() -> String {
    "0.1".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_dir() -> String {
    "./tmp/log".to_string()
}

fn default_log_file() -> String {
    "server.log".to_string()
}

fn default_rotation() -> String {
    "100 MB".to_string()
}

fn default_retention() -> String {
    "30 days".to_string()
}

fn default_compression() -> String {
    "gz".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_format: String::new(),
            log_format_file: String::new(),
            version: default_version(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
            rotation: default_rotation(),
            retention: default_retention(),
            compression: default_compression(),
        }
    }
}

impl LogConfig {
    /// Normalize casing in place and collect every violated constraint
    ///
    /// `log_level` is uppercased and `compression` lowercased before the
    /// membership checks, so a config that passes always carries canonical
    /// casing afterwards. Returns one message per violation; empty means
    /// valid.
    pub fn normalize(&mut self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.log_format.is_empty() {
            issues.push("log_format: must be a non-empty string".to_string());
        }
        if self.log_format_file.is_empty() {
            issues.push("log_format_file: must be a non-empty string".to_string());
        }

        self.log_level = self.log_level.to_uppercase();
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            issues.push(format!(
                "log_level: '{}' is not one of: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if std::path::absolute(Path::new(&self.log_dir)).is_err() {
            issues.push(format!(
                "log_dir: '{}' cannot be resolved to an absolute path",
                self.log_dir
            ));
        }

        self.compression = self.compression.to_lowercase();
        if !VALID_COMPRESSION_FORMATS.contains(&self.compression.as_str()) {
            issues.push(format!(
                "compression: '{}' is not one of: {}",
                self.compression,
                VALID_COMPRESSION_FORMATS.join(", ")
            ));
        }

        issues
    }
}

/// Full configuration document
///
/// The schema is open: top-level keys other than `log` are preserved in
/// `extra` without validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Unrecognized top-level keys, passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
