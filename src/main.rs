use anyhow::{Context, Result};
use tokio::runtime::Runtime;

mod app;
mod config;
mod input;
mod metrics;
mod storage;
mod tasks;

use crate::app::ActivityLogger;
use crate::config::Config;
use crate::input::{DevicePoller, InputSource};
use crate::storage::CsvStore;
use crate::tasks::flush::run_flush_loop;

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Starting mouse activity logger...");

    let config = Config::load()?;
    let rt = Runtime::new()?;

    let logger = ActivityLogger::initialize(CsvStore::new(&config.log_file))?;
    log::info!(
        "Logging to {} every {}s",
        logger.store().path().display(),
        config.log_interval_secs
    );

    let mut input = DevicePoller::new();
    input
        .start(logger.position_sink())
        .context("Failed to start pointer input source")?;

    let result = rt.block_on(run_flush_loop(
        logger,
        config.interval(),
        wait_for_interrupt(),
    ));
    input.stop();

    let written = result?;
    log::info!("Stopped after writing {} records", written);
    Ok(())
}

async fn wait_for_interrupt() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received interrupt, shutting down..."),
        Err(e) => {
            log::error!("Unable to listen for interrupt signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
