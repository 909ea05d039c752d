//! Progress tracking

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

#[derive(Default)]
pub struct ProgressTracker {
    total: AtomicUsize,
    probed: AtomicUsize,
    observed: AtomicUsize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new scan of `total` ports.
    pub fn reset(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.probed.store(0, Ordering::SeqCst);
        self.observed.store(0, Ordering::SeqCst);
    }

    /// Record one finished probe.
    pub fn record(&self, produced_observation: bool) {
        if produced_observation {
            self.observed.fetch_add(1, Ordering::Relaxed);
        }
        self.probed.fetch_add(1, Ordering::Release);
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn probed(&self) -> usize {
        self.probed.load(Ordering::Acquire)
    }

    pub fn observed(&self) -> usize {
        self.observed.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.total().saturating_sub(self.probed())
    }

    pub fn print_summary(&self, elapsed: Duration) {
        let total = self.total();
        let probed = self.probed();

        info!("Scan Summary:");
        info!("  Total ports: {}", total);
        info!("  Probed: {}", probed);
        info!("  Observations: {}", self.observed());
        if total > 0 {
            info!("  Completion: {:.1}%", (probed as f64 / total as f64) * 100.0);
        }
        info!("  Elapsed: {:.2}s", elapsed.as_secs_f64());
    }
}
