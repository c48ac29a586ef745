//! Reporting hooks for child-to-parent mapping gaps.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

/// Receives data-consistency gaps found while resolving children.
///
/// A gap is a retrieved child whose parent is missing from the mapping. It is
/// never an error for the query; the child is skipped and reported here.
pub trait ResolutionObserver: Send + Sync {
    fn on_missing_parent(&self, child_id: &str);
}

/// Logs every gap as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ResolutionObserver for TracingObserver {
    fn on_missing_parent(&self, child_id: &str) {
        warn!(child_id, "retrieved child has no parent mapping, skipping");
    }
}

/// Counts gaps across queries.
#[derive(Debug, Default)]
pub struct GapCounter {
    missing: AtomicU64,
}

impl GapCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gaps seen since creation or the last reset.
    pub fn count(&self) -> u64 {
        self.missing.load(Ordering::Relaxed)
    }

    /// Reset the counter, returning the previous count.
    pub fn reset(&self) -> u64 {
        self.missing.swap(0, Ordering::Relaxed)
    }
}

impl ResolutionObserver for GapCounter {
    fn on_missing_parent(&self, child_id: &str) {
        let total = self.missing.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(child_id, total, "retrieved child has no parent mapping, skipping");
    }
}
