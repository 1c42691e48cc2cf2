//! Single-flight lock and cooperative cancellation for regeneration runs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-flight lock for a regeneration job.
///
/// Clones share the same flag, so every aggregator constructed over the
/// same lock participates in the same single-flight group. Acquisition is a
/// compare-and-swap: there is no queueing, a contender simply fails fast.
#[derive(Debug, Clone, Default)]
pub struct RegenerationLock {
    held: Arc<AtomicBool>,
}

impl RegenerationLock {
    /// Create a fresh, unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire the lock. Returns `None` if a run already holds it.
    pub fn try_acquire(&self) -> Option<RegenerationGuard> {
        if self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(RegenerationGuard {
                held: Arc::clone(&self.held),
            })
        } else {
            None
        }
    }

    /// Whether a run currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Guard proving lock ownership; releases on drop.
#[derive(Debug)]
pub struct RegenerationGuard {
    held: Arc<AtomicBool>,
}

impl Drop for RegenerationGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

/// Cooperative cancellation flag for a long-running batch.
///
/// Checked between group computations, never mid-group, so committed
/// groups always stay intact.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a flag that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
