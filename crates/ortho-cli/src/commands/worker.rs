//! `ortho worker` - background aggregation on an interval.

use crate::cli::WorkerArgs;
use crate::error::Result;
use crate::Config;
use ortho_aggregator::AggregatorWorker;
use ortho_store::SqliteStore;
use std::time::Duration;

/// Execute the worker command. Runs until Ctrl+C.
pub async fn execute_worker(args: WorkerArgs, config: &Config) -> Result<()> {
    let store = SqliteStore::new(&config.db_path)?;

    let minutes = args
        .interval_minutes
        .unwrap_or(config.aggregator.worker_interval_minutes)
        .max(1);
    let mut worker = AggregatorWorker::with_interval(
        config.aggregator_config(),
        Duration::from_secs(minutes * 60),
    );

    worker.run(store).await?;
    Ok(())
}
