//! OrthoEvidence Finding Aggregator
//!
//! Regenerates the five derived evidence tables from research findings:
//!
//! - **Age-risk profiles**: pooled untreated-risk per age threshold
//! - **Issue-treatment effects**: pooled effect per (issue, category)
//! - **Age-timing benefits**: treatment-window assessment per age band
//! - **Future scenarios**: with/without-treatment projections
//! - **Economic impacts**: cost/savings/ROI per age band
//!
//! # Semantics
//!
//! Within each group, the pooled effect is the sample-size-weighted mean of
//! the findings' effect values, the direction is the majority direction (an
//! exact tie excludes the group rather than picking a side), and the
//! confidence is a deterministic, monotone function of the contributing
//! papers' count and evidence levels. Every row records the exact set of
//! contributing paper ids.
//!
//! Writes are keyed upserts: re-running aggregation on an unchanged finding
//! set reproduces every row byte-for-byte and never accumulates duplicates.
//! A group whose inputs violate referential integrity is skipped with a
//! reason, aborting only that group, never the batch.
//!
//! # Concurrency
//!
//! Aggregation is a single-flight batch: a second concurrent run over the
//! same [`RegenerationLock`] fails fast with `AlreadyRunning`. The batch is
//! cancellable between group computations (not mid-group); previously
//! committed groups stay intact.
//!
//! # Usage
//!
//! ## One-time regeneration
//!
//! ```no_run
//! use ortho_aggregator::{Aggregator, AggregatorConfig, CancelFlag};
//! use ortho_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("ortho_evidence.db")?;
//! let aggregator = Aggregator::new(AggregatorConfig::default());
//!
//! let report = aggregator.run(&mut store, &CancelFlag::new())?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background worker
//!
//! ```no_run
//! use ortho_aggregator::{AggregatorWorker, AggregatorConfig};
//! use ortho_store::SqliteStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::new("ortho_evidence.db")?;
//!     let mut worker = AggregatorWorker::new(AggregatorConfig::default());
//!
//!     // Run indefinitely (until Ctrl+C)
//!     worker.run(store).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod aggregator;
mod config;
mod error;
mod lock;
mod report;
mod templates;
mod worker;

pub use aggregator::Aggregator;
pub use config::{AggregatorConfig, EconomicBandSpec, TimingBandSpec};
pub use error::AggregateError;
pub use lock::{CancelFlag, RegenerationLock};
pub use report::{AggregationReport, GroupKey, SkipReason, SkippedGroup};
pub use worker::AggregatorWorker;
