//! Background worker for scheduled regeneration

use crate::{AggregateError, Aggregator, AggregatorConfig, CancelFlag};
use ortho_domain::traits::EvidenceStore;
use tokio::time::{interval, Duration};

/// Background worker that re-runs aggregation on a schedule.
///
/// The worker keeps the derived tables fresh as new findings arrive. Each
/// cycle is one single-flight batch; a cycle that finds the lock held (an
/// ad-hoc regeneration is in flight) is skipped, not queued.
///
/// # Examples
///
/// ```no_run
/// use ortho_aggregator::{AggregatorWorker, AggregatorConfig};
/// use ortho_store::SqliteStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = SqliteStore::new("ortho_evidence.db")?;
///     let mut worker = AggregatorWorker::new(AggregatorConfig::default());
///
///     // Run indefinitely (until Ctrl+C)
///     worker.run(store).await?;
///     Ok(())
/// }
/// ```
pub struct AggregatorWorker {
    aggregator: Aggregator,
    interval: Duration,
    cancel: CancelFlag,
}

/// How often the worker re-aggregates by default.
const DEFAULT_INTERVAL_MINUTES: u64 = 60;

impl AggregatorWorker {
    /// Create a worker with the given configuration and the default
    /// interval.
    pub fn new(config: AggregatorConfig) -> Self {
        Self::with_interval(config, Duration::from_secs(DEFAULT_INTERVAL_MINUTES * 60))
    }

    /// Create a worker with an explicit sweep interval.
    pub fn with_interval(config: AggregatorConfig, interval: Duration) -> Self {
        Self {
            aggregator: Aggregator::new(config),
            interval,
            cancel: CancelFlag::new(),
        }
    }

    /// The cancellation flag handed to every batch. Cancelling stops the
    /// in-flight batch between groups.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run the worker indefinitely.
    ///
    /// Re-aggregates at the configured interval until a shutdown signal
    /// (Ctrl+C) is received; the in-flight batch is then cancelled between
    /// groups and committed groups stay intact.
    pub async fn run<S>(&mut self, mut store: S) -> Result<(), AggregateError>
    where
        S: EvidenceStore,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(interval = ?self.interval, "aggregation worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::debug!("starting aggregation cycle");

                    match self.aggregator.run(&mut store, &self.cancel) {
                        Ok(report) => {
                            tracing::info!(
                                rows = report.total_rows(),
                                skipped = report.skipped.len(),
                                "aggregation cycle completed"
                            );
                        }
                        Err(AggregateError::AlreadyRunning) => {
                            tracing::warn!("skipping cycle: another regeneration holds the lock");
                        }
                        Err(e) => {
                            tracing::error!("aggregation cycle failed: {}", e);
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received, stopping worker");
                    self.cancel.cancel();
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run for a specific number of cycles (useful for testing).
    pub async fn run_cycles<S>(&mut self, mut store: S, cycles: usize) -> Result<(), AggregateError>
    where
        S: EvidenceStore,
    {
        let mut ticker = interval(self.interval);

        tracing::info!(cycles, interval = ?self.interval, "aggregation worker started");

        for cycle in 0..cycles {
            ticker.tick().await;

            tracing::debug!("starting aggregation cycle {}/{}", cycle + 1, cycles);

            match self.aggregator.run(&mut store, &self.cancel) {
                Ok(report) => {
                    tracing::info!(
                        rows = report.total_rows(),
                        skipped = report.skipped.len(),
                        "aggregation cycle {}/{} completed",
                        cycle + 1,
                        cycles
                    );
                }
                Err(AggregateError::AlreadyRunning) => {
                    tracing::warn!("cycle {}/{} skipped: lock held", cycle + 1, cycles);
                }
                Err(e) => {
                    tracing::error!("aggregation cycle {}/{} failed: {}", cycle + 1, cycles, e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}
