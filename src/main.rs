//! Keel demo entry point.

use std::path::Path;

use keel::infrastructure::setup;
use keel::{AppContext, LogRotator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let context = AppContext::project_local();
    if setup::ensure_default_config(context.config_loader().config_path())? {
        println!(
            "wrote default config to {}",
            context.config_loader().config_path().display()
        );
    }

    let log = context.get_logger("MAIN");
    log.info("keel demo starting");
    log.debug("debug output is filtered by the configured level");
    log.info_with(
        "structured fields ride along",
        &[("request_id", "42".to_string())],
    );

    match context.config_loader().get_log_config() {
        Ok(log_config) => match LogRotator::from_log_config(&log_config) {
            Ok(rotator) => {
                let log_path = Path::new(&log_config.log_dir).join(&log_config.log_file);
                rotator.rotate_if_needed(&log_path).await?;
                let deleted = rotator.cleanup_old_logs(&log_config.log_dir).await?;
                log.info(&format!("retention cleanup removed {deleted} file(s)"));
            }
            Err(err) => log.warning(&format!("rotation disabled: {err}")),
        },
        Err(err) => log.error(&format!("configuration unavailable: {err}")),
    }

    log.info("keel demo finished");
    // Flush the non-blocking writers before exiting
    context.reset_logger();
    Ok(())
}
