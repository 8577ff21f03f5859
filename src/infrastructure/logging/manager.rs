//! Logger lifecycle management
//!
//! One `LoggerManager` owns the sink stack for the process: a colorized
//! console sink and a non-blocking file sink, both driven by the configured
//! line templates and level. Handles are plain values bound with a tag and
//! the configured version; emission goes through `tracing`.
//!
//! Obtaining a logger never fails: any error during sink setup degrades the
//! manager to a console-only fallback instead of propagating.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

use super::format::{FieldList, LineFormatter, LineTemplate, TemplateError};
use crate::domain::models::config::LogConfig;
use crate::infrastructure::config::{ConfigError, ConfigLoader};

/// Tag attached to handles when the caller has no better label
pub const DEFAULT_TAG: &str = "DEFAULT";

/// Tag used for the manager's own startup records
const SYSTEM_TAG: &str = "SYSTEM";

/// Version label bound to the fallback handle
const FALLBACK_VERSION: &str = "1.0.0";

/// Errors that can interrupt sink setup
///
/// Never escapes `init_logger`; consumed by the fallback branch.
#[derive(Error, Debug)]
pub enum LoggerInitError {
    /// The logging configuration could not be loaded
    #[error("failed to load logging configuration: {0}")]
    Config(#[from] ConfigError),

    /// The configured level is not mappable to a filter level
    #[error("invalid log level: {0}")]
    Level(String),

    /// A line template failed to parse
    #[error("invalid log format template: {0}")]
    Template(#[from] TemplateError),

    /// The log directory could not be created
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

type SinkStack = Vec<Box<dyn Layer<Registry> + Send + Sync>>;

/// Handle to the process-wide reload-able sink stack
///
/// The tracing dispatcher can only be installed once per process, so the
/// registry goes in once behind a reload layer and every later init/reset
/// swaps the layer stack through this handle. If some other subscriber was
/// installed first the swap is a no-op and no records reach our sinks.
fn sink_stack() -> &'static reload::Handle<SinkStack, Registry> {
    static HANDLE: OnceLock<reload::Handle<SinkStack, Registry>> = OnceLock::new();
    HANDLE.get_or_init(|| {
        let (layer, handle) = reload::Layer::new(SinkStack::new());
        let _ = tracing_subscriber::registry().with(layer).try_init();
        handle
    })
}

/// Base logger handle carrying the version label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseLogger {
    version: String,
    level: Level,
}

impl BaseLogger {
    /// Derive a handle with a tag label attached
    pub fn bind(&self, tag: impl Into<String>) -> TaggedLogger {
        TaggedLogger {
            tag: tag.into(),
            version: self.version.clone(),
            level: self.level,
        }
    }

    /// Level the sinks were registered with
    pub fn level(&self) -> Level {
        self.level
    }

    /// Version label bound to every record
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Tag-bound logger handle
///
/// Cheap to clone and safe to hand out across the application; the tag and
/// version ride along as fields on every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLogger {
    tag: String,
    version: String,
    level: Level,
}

impl TaggedLogger {
    /// Tag label attached to every record
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Level the sinks were registered with
    pub fn level(&self) -> Level {
        self.level
    }

    /// Emit a DEBUG record
    pub fn debug(&self, message: &str) {
        tracing::debug!(tag = %self.tag, version = %self.version, "{message}");
    }

    /// Emit an INFO record
    pub fn info(&self, message: &str) {
        tracing::info!(tag = %self.tag, version = %self.version, "{message}");
    }

    /// Emit a WARNING record
    pub fn warning(&self, message: &str) {
        tracing::warn!(tag = %self.tag, version = %self.version, "{message}");
    }

    /// Emit an ERROR record
    pub fn error(&self, message: &str) {
        tracing::error!(tag = %self.tag, version = %self.version, "{message}");
    }

    /// Emit a CRITICAL record
    ///
    /// tracing has no level above ERROR; critical records are ERROR with a
    /// `critical` marker field.
    pub fn critical(&self, message: &str) {
        tracing::error!(tag = %self.tag, version = %self.version, critical = true, "{message}");
    }

    /// Emit a DEBUG record with structured extra fields
    pub fn debug_with(&self, message: &str, fields: &[(&str, String)]) {
        tracing::debug!(tag = %self.tag, version = %self.version, extra = %FieldList(fields), "{message}");
    }

    /// Emit an INFO record with structured extra fields
    pub fn info_with(&self, message: &str, fields: &[(&str, String)]) {
        tracing::info!(tag = %self.tag, version = %self.version, extra = %FieldList(fields), "{message}");
    }

    /// Emit a WARNING record with structured extra fields
    pub fn warning_with(&self, message: &str, fields: &[(&str, String)]) {
        tracing::warn!(tag = %self.tag, version = %self.version, extra = %FieldList(fields), "{message}");
    }

    /// Emit an ERROR record with structured extra fields
    pub fn error_with(&self, message: &str, fields: &[(&str, String)]) {
        tracing::error!(tag = %self.tag, version = %self.version, extra = %FieldList(fields), "{message}");
    }

    /// Emit a CRITICAL record with structured extra fields
    pub fn critical_with(&self, message: &str, fields: &[(&str, String)]) {
        tracing::error!(tag = %self.tag, version = %self.version, critical = true, extra = %FieldList(fields), "{message}");
    }
}

/// Observable lifecycle state of a `LoggerManager`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerStatus {
    /// No sinks registered yet
    Uninitialized,
    /// Sinks registered from the loaded configuration
    Ready,
    /// Sink setup failed; console-only sink at INFO
    Fallback,
}

enum ManagerState {
    Uninitialized,
    Ready {
        base: BaseLogger,
        // Dropping the guards flushes and shuts down the writer threads
        _guards: Vec<WorkerGuard>,
    },
    Fallback {
        base: BaseLogger,
    },
}

/// Logger manager: one-time sink registration and tag-bound handles
///
/// State machine: UNINITIALIZED → READY on successful init, UNINITIALIZED →
/// FALLBACK on any init failure, READY/FALLBACK → UNINITIALIZED on reset.
/// Initialization is serialized behind a mutex so two racing first callers
/// cannot register sinks twice.
pub struct LoggerManager {
    config_loader: Arc<ConfigLoader>,
    state: Mutex<ManagerState>,
}

impl LoggerManager {
    /// Manager obtaining its configuration from the given loader
    pub fn new(config_loader: Arc<ConfigLoader>) -> Self {
        Self {
            config_loader,
            state: Mutex::new(ManagerState::Uninitialized),
        }
    }

    /// Register sinks once and return the base handle
    ///
    /// Idempotent: later calls return the handle registered first. A failure
    /// anywhere in the setup sequence swaps in a console-only INFO sink,
    /// binds a fallback handle, logs the triggering error through it and
    /// returns that handle instead of an error.
    pub fn init_logger(&self) -> BaseLogger {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        match &*state {
            ManagerState::Ready { base, .. } | ManagerState::Fallback { base } => {
                return base.clone()
            }
            ManagerState::Uninitialized => {}
        }

        match self.register_sinks() {
            Ok((base, guards)) => {
                *state = ManagerState::Ready {
                    base: base.clone(),
                    _guards: guards,
                };
                base
            }
            Err(err) => {
                let base = install_fallback(&err);
                *state = ManagerState::Fallback { base: base.clone() };
                base
            }
        }
    }

    /// Tag-bound handle, initializing sinks on first use
    pub fn get_logger(&self, tag: &str) -> TaggedLogger {
        self.init_logger().bind(tag)
    }

    /// Tear down sinks and return to UNINITIALIZED
    ///
    /// Dropping the previous state flushes the non-blocking writers. Test
    /// support; not used in normal operation.
    pub fn reset_logger(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = sink_stack().reload(SinkStack::new());
        *state = ManagerState::Uninitialized;
    }

    /// Current lifecycle state
    pub fn status(&self) -> LoggerStatus {
        match &*self.state.lock().unwrap_or_else(PoisonError::into_inner) {
            ManagerState::Uninitialized => LoggerStatus::Uninitialized,
            ManagerState::Ready { .. } => LoggerStatus::Ready,
            ManagerState::Fallback { .. } => LoggerStatus::Fallback,
        }
    }

    fn register_sinks(&self) -> Result<(BaseLogger, Vec<WorkerGuard>), LoggerInitError> {
        let config = self.config_loader.get_log_config()?;

        let level = parse_log_level(&config.log_level)?;
        let console_template = LineTemplate::parse(&config.log_format)?;
        let file_template = LineTemplate::parse(&config.log_format_file)?;

        let log_dir = PathBuf::from(&config.log_dir);
        std::fs::create_dir_all(&log_dir).map_err(|source| LoggerInitError::CreateDir {
            path: log_dir.clone(),
            source,
        })?;
        let log_file_path = log_dir.join(&config.log_file);

        let (console_writer, console_guard) = tracing_appender::non_blocking(io::stdout());
        let (file_writer, file_guard) =
            tracing_appender::non_blocking(rolling::never(&log_dir, &config.log_file));

        let filter = LevelFilter::from_level(level);
        let stack: SinkStack = vec![
            tracing_subscriber::fmt::layer()
                .event_format(LineFormatter::new(console_template))
                .with_writer(console_writer)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            tracing_subscriber::fmt::layer()
                .event_format(LineFormatter::new(file_template))
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(filter)
                .boxed(),
        ];
        let _ = sink_stack().reload(stack);

        let base = BaseLogger {
            version: config.version.clone(),
            level,
        };
        log_startup(&base, &config, &log_file_path);

        Ok((base, vec![console_guard, file_guard]))
    }
}

fn log_startup(base: &BaseLogger, config: &LogConfig, log_file_path: &std::path::Path) {
    let system = base.bind(SYSTEM_TAG);
    system.info("logging initialized");
    system.info(&format!("console log level: {}", config.log_level));
    system.info(&format!("log file: {}", log_file_path.display()));
    system.info(&format!("rotation: {}", config.rotation));
    system.info(&format!("retention: {}", config.retention));
}

fn install_fallback(err: &LoggerInitError) -> BaseLogger {
    let stack: SinkStack = vec![tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_filter(LevelFilter::INFO)
        .boxed()];
    let _ = sink_stack().reload(stack);

    let base = BaseLogger {
        version: FALLBACK_VERSION.to_string(),
        level: Level::INFO,
    };
    base.bind("ERROR")
        .error(&format!("logger initialization failed, using fallback: {err}"));
    base
}

/// Map a validated config level to a tracing level
///
/// tracing has no CRITICAL; it filters like ERROR.
fn parse_log_level(level: &str) -> Result<Level, LoggerInitError> {
    match level {
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARNING" => Ok(Level::WARN),
        "ERROR" | "CRITICAL" => Ok(Level::ERROR),
        other => Err(LoggerInitError::Level(other.to_string())),
    }
}
