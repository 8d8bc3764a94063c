use std::sync::atomic::{AtomicU64, Ordering};
use telemetry_common::event::PartitionKey;
use tracing::warn;

/// Throttles "buffer full" warnings for one partition.
///
/// A warning goes out when the consecutive drop count is a power of two or a
/// multiple of 100: dense at the start of an overload, sparse once it lasts.
#[derive(Debug, Default)]
pub struct BackpressureReporter {
    warnings_logged: AtomicU64,
}

impl BackpressureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_report(consecutive_drops: u64) -> bool {
        consecutive_drops > 0
            && (consecutive_drops.is_power_of_two() || consecutive_drops % 100 == 0)
    }

    /// Returns whether a warning was logged. The event itself is never
    /// logged, only the key and the count.
    pub fn record_drop(&self, key: &PartitionKey, consecutive_drops: u64) -> bool {
        if !Self::should_report(consecutive_drops) {
            return false;
        }

        self.warnings_logged.fetch_add(1, Ordering::Relaxed);
        warn!(
            partition = %key,
            dropped = consecutive_drops,
            "event buffer full, dropping event"
        );
        true
    }

    pub fn warnings_logged(&self) -> u64 {
        self.warnings_logged.load(Ordering::Relaxed)
    }
}
