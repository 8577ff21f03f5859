//! Size-based log rotation and retention cleanup
//!
//! The file sink appends to a single active file; the rotation threshold in
//! the config is a size string ("100 MB"), so rotation happens here: the
//! active file is renamed with a timestamp suffix once it crosses the
//! threshold, and rotated files older than the retention period are deleted.
//! Compression of rotated files is left to the operator; the configured
//! format is only recorded.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::domain::models::config::LogConfig;

/// Log file rotator driven by the `rotation`/`retention` config strings
#[derive(Debug, Clone)]
pub struct LogRotator {
    /// Maximum active file size in bytes before rotation
    max_file_size: u64,
    /// How long rotated files are kept
    retention: StdDuration,
}

impl LogRotator {
    /// Rotator with an explicit size threshold and retention period
    pub fn new(max_file_size: u64, retention: StdDuration) -> Self {
        Self {
            max_file_size,
            retention,
        }
    }

    /// Build a rotator from a validated logging config
    ///
    /// Fails when the rotation size or retention duration strings cannot be
    /// parsed.
    pub fn from_log_config(config: &LogConfig) -> Result<Self> {
        let max_file_size = parse_size(&config.rotation)
            .with_context(|| format!("invalid rotation threshold: {}", config.rotation))?;
        // humantime rejects "30 days" but accepts "30days"
        let retention = humantime::parse_duration(&config.retention.replace(' ', ""))
            .with_context(|| format!("invalid retention duration: {}", config.retention))?;
        Ok(Self::new(max_file_size, retention))
    }

    /// Whether the active file exists and has crossed the size threshold
    pub async fn should_rotate(&self, log_path: impl AsRef<Path>) -> Result<bool> {
        let log_path = log_path.as_ref();

        if !log_path.exists() {
            return Ok(false);
        }

        let metadata = tokio::fs::metadata(log_path)
            .await
            .context("failed to read log file metadata")?;
        let size = metadata.len();

        debug!(
            path = %log_path.display(),
            size = size,
            max_size = self.max_file_size,
            "checked rotation threshold"
        );

        Ok(size >= self.max_file_size)
    }

    /// Rotate the active file by renaming it with a timestamp suffix
    ///
    /// `server.log` becomes `server.log.20260807_120000`. The sink recreates
    /// the active file on its next write.
    pub async fn rotate_if_needed(&self, log_path: impl AsRef<Path>) -> Result<()> {
        let log_path = log_path.as_ref();

        if !self.should_rotate(log_path).await? {
            return Ok(());
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let rotated_path = PathBuf::from(format!("{}.{timestamp}", log_path.display()));

        tokio::fs::rename(log_path, &rotated_path)
            .await
            .context("failed to rotate log file")?;

        info!(
            old_path = %log_path.display(),
            new_path = %rotated_path.display(),
            "rotated log file"
        );

        Ok(())
    }

    /// Delete log files older than the retention period
    ///
    /// Matches the active file and timestamped rotations by the `.log`
    /// marker in the file name; everything else in the directory is left
    /// alone. Returns the number of files deleted.
    pub async fn cleanup_old_logs(&self, log_dir: impl AsRef<Path>) -> Result<usize> {
        let log_dir = log_dir.as_ref();

        if !log_dir.exists() {
            warn!(path = %log_dir.display(), "log directory does not exist");
            return Ok(0);
        }

        let retention =
            Duration::from_std(self.retention).context("retention duration out of range")?;
        let cutoff = Utc::now() - retention;
        let mut deleted = 0;

        let mut entries = tokio::fs::read_dir(log_dir)
            .await
            .context("failed to read log directory")?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read directory entry")?
        {
            let path = entry.path();

            let is_log_file = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(".log"));
            if !is_log_file {
                continue;
            }

            let metadata = tokio::fs::metadata(&path)
                .await
                .context("failed to read file metadata")?;
            let modified: DateTime<Utc> = metadata
                .modified()
                .context("failed to read file modification time")?
                .into();

            if modified < cutoff {
                tokio::fs::remove_file(&path)
                    .await
                    .context("failed to delete expired log file")?;

                info!(
                    path = %path.display(),
                    age_days = (Utc::now() - modified).num_days(),
                    "deleted expired log file"
                );
                deleted += 1;
            }
        }

        if deleted > 0 {
            info!(count = deleted, "retention cleanup finished");
        }

        Ok(deleted)
    }

    /// Rotate and clean up on a fixed interval until the task is dropped
    pub async fn run_periodic_cleanup(
        &self,
        log_path: impl AsRef<Path>,
        interval: StdDuration,
    ) -> Result<()> {
        let log_path = log_path.as_ref().to_path_buf();
        let log_dir = log_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            if let Err(e) = self.rotate_if_needed(&log_path).await {
                warn!(error = %e, "periodic rotation failed");
            }
            match self.cleanup_old_logs(&log_dir).await {
                Ok(count) if count > 0 => {
                    info!(count = count, "periodic cleanup removed files");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "periodic cleanup failed"),
            }
        }
    }
}

/// Parse a size string like "100 MB" into bytes
///
/// Decimal units (KB = 1000 bytes); bare numbers are bytes.
fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let unit_start = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(unit_start);

    let value: f64 = number
        .trim()
        .parse()
        .with_context(|| format!("invalid size number: '{number}'"))?;
    let multiplier: u64 = match unit.trim().to_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1_000,
        "MB" => 1_000_000,
        "GB" => 1_000_000_000,
        other => bail!("unknown size unit: '{other}'"),
    };

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bytes = (value * multiplier as f64) as u64;
    Ok(bytes)
}
