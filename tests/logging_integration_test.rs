// Integration tests for logging functionality
// Note: the tracing dispatcher is process-global, so the scenarios share one
// test body. Run with: cargo test --test logging_integration_test -- --test-threads=1

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use keel::{ConfigLoader, LoggerManager, LoggerStatus, DEFAULT_TAG};
use tempfile::TempDir;
use tracing::Level;

fn write_config(dir: &TempDir, log_dir: &Path) -> PathBuf {
    let config_path = dir.path().join("config.yaml");
    let yaml = format!(
        r#"log:
  log_format: "{{time}} | {{level}} | [{{tag}}] {{message}} {{fields}}"
  log_format_file: "{{time}} | {{level}} | [{{tag}}] v{{version}} {{message}} {{fields}}"
  version: "2.5"
  log_level: "debug"
  log_dir: "{}"
  log_file: "it.log"
"#,
        log_dir.display()
    );
    fs::write(&config_path, yaml).unwrap();
    config_path
}

/// Main integration test that covers multiple scenarios
#[test]
fn test_logging_comprehensive() {
    let config_dir = TempDir::new().unwrap();
    let log_dir = TempDir::new().unwrap();
    let config_path = write_config(&config_dir, log_dir.path());

    let loader = Arc::new(ConfigLoader::new(config_path));
    let manager = LoggerManager::new(Arc::clone(&loader));
    assert_eq!(manager.status(), LoggerStatus::Uninitialized);

    // First initialization registers sinks and binds the configured version
    let base = manager.init_logger();
    assert_eq!(manager.status(), LoggerStatus::Ready);
    assert_eq!(base.version(), "2.5");
    assert_eq!(base.level(), Level::DEBUG);

    // Idempotence: the same handle comes back
    let again = manager.init_logger();
    assert_eq!(base, again);

    let tagged = manager.get_logger("WORKER");
    assert_eq!(tagged.tag(), "WORKER");
    tagged.info("hello from the worker");
    tagged.info_with("fields ride along", &[("job", "7".to_string())]);
    tagged.debug("debug line");
    tagged.critical("simulated emergency");

    // Reset flushes the non-blocking file writer
    manager.reset_logger();
    assert_eq!(manager.status(), LoggerStatus::Uninitialized);

    let log_file = log_dir.path().join("it.log");
    let contents = fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("hello from the worker"));
    assert!(contents.contains("[WORKER]"));
    assert!(contents.contains("v2.5"));
    assert!(contents.contains("job=7"));
    assert!(contents.contains("debug line"));
    assert!(contents.contains("simulated emergency"));
    assert!(contents.contains("[SYSTEM]"));
    assert_eq!(
        contents.matches("logging initialized").count(),
        1,
        "sinks must register exactly once"
    );

    // Reset followed by get_logger re-runs the full initialization
    let revived = manager.get_logger(DEFAULT_TAG);
    assert_eq!(manager.status(), LoggerStatus::Ready);
    assert_eq!(revived.tag(), DEFAULT_TAG);
    revived.info("after reset");
    manager.reset_logger();

    let contents = fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("after reset"));
    assert_eq!(
        contents.matches("logging initialized").count(),
        2,
        "re-initialization registers sinks again"
    );

    // A loader pointing at nothing degrades to the console fallback
    let broken = LoggerManager::new(Arc::new(ConfigLoader::new(
        config_dir.path().join("missing.yaml"),
    )));
    let fallback = broken.get_logger("X");
    assert_eq!(broken.status(), LoggerStatus::Fallback);
    assert_eq!(fallback.level(), Level::INFO);
    assert_eq!(fallback.tag(), "X");
    fallback.info("fallback still logs");

    // Fallback is sticky until reset
    let fallback_again = broken.get_logger("Y");
    assert_eq!(broken.status(), LoggerStatus::Fallback);
    assert_eq!(fallback_again.level(), Level::INFO);
    broken.reset_logger();
    assert_eq!(broken.status(), LoggerStatus::Uninitialized);

    // An unwritable log directory degrades the same way
    let occupied = config_dir.path().join("occupied");
    fs::write(&occupied, b"not a directory").unwrap();
    let bad_dir_config = config_dir.path().join("bad_dir.yaml");
    fs::write(
        &bad_dir_config,
        format!(
            "log:\n  log_format: \"{{message}}\"\n  log_format_file: \"{{message}}\"\n  log_dir: \"{}\"\n",
            occupied.join("logs").display()
        ),
    )
    .unwrap();
    let undirable = LoggerManager::new(Arc::new(ConfigLoader::new(bad_dir_config)));
    let handle = undirable.get_logger("X");
    assert_eq!(undirable.status(), LoggerStatus::Fallback);
    assert_eq!(handle.level(), Level::INFO);

    // So does a template with an unknown placeholder
    let bad_template_config = config_dir.path().join("bad_template.yaml");
    fs::write(
        &bad_template_config,
        "log:\n  log_format: \"{nope}\"\n  log_format_file: \"{message}\"\n",
    )
    .unwrap();
    let untemplated = LoggerManager::new(Arc::new(ConfigLoader::new(bad_template_config)));
    untemplated.init_logger();
    assert_eq!(untemplated.status(), LoggerStatus::Fallback);
}
