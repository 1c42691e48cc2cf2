//! `ortho aggregate` - run one regeneration batch.

use crate::error::Result;
use crate::{Config, Formatter};
use ortho_aggregator::{Aggregator, CancelFlag};
use ortho_store::SqliteStore;

/// Execute the aggregate command.
pub fn execute_aggregate(config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = SqliteStore::new(&config.db_path)?;
    let aggregator = Aggregator::new(config.aggregator_config());

    let cancel = CancelFlag::new();
    let handle = cancel.clone();
    ctrlc_handler(handle);

    let report = aggregator.run(&mut store, &cancel)?;
    println!("{}", report.summary());
    if !report.cancelled {
        println!("{}", formatter.success("Derived tables regenerated"));
    }
    Ok(())
}

/// Cancel the batch between groups on Ctrl+C; committed groups stay.
fn ctrlc_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("cancellation requested; stopping after the current group");
            cancel.cancel();
        }
    });
}
