use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::{Config, LogConfig};

/// Fixed project-local configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Optional sibling override file merged on top of the primary config
const LOCAL_OVERRIDE_FILE: &str = "local.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist at the expected path
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// The document could not be parsed or extracted
    #[error("config file format error: {0}")]
    Format(String),

    /// One or more schema constraints were violated
    #[error("config validation failed: {}", .issues.join("; "))]
    Validation {
        /// One entry per violated constraint
        issues: Vec<String>,
    },
}

/// Configuration loader with hierarchical merging and a validated cache
///
/// Precedence (lowest to highest):
/// 1. Programmatic defaults (Serialized)
/// 2. The configured YAML file (must exist)
/// 3. A `local.yaml` sibling (optional, for dev/test overrides)
///
/// `validate_config` always re-reads and replaces the cache; the getters
/// trigger one lazy load and reuse it afterwards.
///
/// Configuration is project-local (`config/config.yaml` under the working
/// directory) so several deployments on one machine stay independent.
pub struct ConfigLoader {
    config_path: PathBuf,
    cache: RwLock<Option<Config>>,
}

impl ConfigLoader {
    /// Loader over an explicit configuration file path
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Loader over the fixed project-local path
    pub fn project_local() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }

    /// Path of the primary configuration file
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn local_override_path(&self) -> PathBuf {
        self.config_path.with_file_name(LOCAL_OVERRIDE_FILE)
    }

    /// Read, merge and validate the configuration document
    ///
    /// Fails with `NotFound` when the primary file is missing, `Format` when
    /// the document cannot be parsed, and `Validation` aggregating every
    /// violated field constraint. On success the cache is replaced and the
    /// normalized document returned.
    pub fn validate_config(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let mut config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&self.config_path))
            .merge(Yaml::file(self.local_override_path()))
            .extract()
            .map_err(|e| ConfigError::Format(e.to_string()))?;

        let issues = config.log.normalize();
        if !issues.is_empty() {
            return Err(ConfigError::Validation { issues });
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = Some(config.clone());
        Ok(config)
    }

    /// Cached logging section, loading lazily on first use
    pub fn get_log_config(&self) -> Result<LogConfig, ConfigError> {
        self.get_config().map(|config| config.log)
    }

    /// Cached full document, loading lazily on first use
    pub fn get_config(&self) -> Result<Config, ConfigError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cache.as_ref() {
                return Ok(config.clone());
            }
        }
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID_YAML: &str = r#"
log:
  log_format: "{time} | {level} | [{tag}] {message}"
  log_format_file: "{time} | {level} | [{tag}] v{version} {message}"
  log_level: "info"
  compression: "GZ"
database:
  url: "postgres://localhost/app"
"#;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_valid_config_loads_and_normalizes() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(write_config(&dir, VALID_YAML));

        let config = loader.validate_config().expect("config should validate");
        assert_eq!(config.log.log_level, "INFO");
        assert_eq!(config.log.compression, "gz");
        assert_eq!(config.log.version, "0.1");
        assert!(config.extra.contains_key("database"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.yaml");
        let loader = ConfigLoader::new(&path);

        match loader.validate_config() {
            Err(ConfigError::NotFound(reported)) => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml_is_format_error() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(write_config(&dir, "log: [unclosed"));

        assert!(matches!(
            loader.validate_config(),
            Err(ConfigError::Format(_))
        ));
    }

    #[test]
    fn test_missing_log_format_identifies_field() {
        let dir = TempDir::new().unwrap();
        let yaml = "log:\n  log_format_file: \"{message}\"\n";
        let loader = ConfigLoader::new(write_config(&dir, yaml));

        match loader.validate_config() {
            Err(ConfigError::Validation { issues }) => {
                assert_eq!(issues.len(), 1);
                assert!(issues[0].contains("log_format"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_level_lists_valid_levels() {
        let dir = TempDir::new().unwrap();
        let yaml = "log:\n  log_format: \"{message}\"\n  log_format_file: \"{message}\"\n  log_level: \"TRACE\"\n";
        let loader = ConfigLoader::new(write_config(&dir, yaml));

        let err = loader.validate_config().unwrap_err();
        assert!(err
            .to_string()
            .contains("DEBUG, INFO, WARNING, ERROR, CRITICAL"));
    }

    #[test]
    fn test_violations_aggregate_in_message() {
        let dir = TempDir::new().unwrap();
        let yaml = "log:\n  log_level: \"verbose\"\n  compression: \"rar\"\n";
        let loader = ConfigLoader::new(write_config(&dir, yaml));

        match loader.validate_config() {
            Err(ConfigError::Validation { issues }) => assert_eq!(issues.len(), 4),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_getters_reuse_cache_without_rereading() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, VALID_YAML);
        let loader = ConfigLoader::new(&path);

        let first = loader.get_log_config().expect("first load");
        fs::remove_file(&path).unwrap();
        let second = loader.get_log_config().expect("cached load");
        assert_eq!(first, second);
    }

    #[test]
    fn test_validate_config_rereads_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, VALID_YAML);
        let loader = ConfigLoader::new(&path);

        assert_eq!(loader.get_log_config().unwrap().log_level, "INFO");

        fs::write(&path, VALID_YAML.replace("\"info\"", "\"error\"")).unwrap();
        let reloaded = loader.validate_config().unwrap();
        assert_eq!(reloaded.log.log_level, "ERROR");
        assert_eq!(loader.get_log_config().unwrap().log_level, "ERROR");
    }

    #[test]
    fn test_local_override_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, VALID_YAML);
        fs::write(
            dir.path().join("local.yaml"),
            "log:\n  log_level: \"warning\"\n",
        )
        .unwrap();
        let loader = ConfigLoader::new(path);

        let config = loader.validate_config().unwrap();
        assert_eq!(config.log.log_level, "WARNING", "override should win");
        assert_eq!(
            config.log.compression, "gz",
            "base value should persist when not overridden"
        );
    }

    #[test]
    fn test_project_local_path() {
        let loader = ConfigLoader::project_local();
        assert_eq!(loader.config_path(), Path::new(DEFAULT_CONFIG_PATH));
    }
}
