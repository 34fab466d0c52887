use std::time::Duration;

/// Default bound on concurrently scanned targets. Rate limits on the
/// tagging and registry services are shared per account, so fan-out stays
/// explicit and bounded.
pub const DEFAULT_MAX_PARALLEL: usize = 3;

/// Tunables threaded through the engine. No process-wide state; tests
/// shrink the delays to zero.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum resources per bulk configuration lookup.
    pub batch_size: usize,
    /// Wait before the single retry of a throttled fallback lookup.
    pub throttle_backoff: Duration,
    /// Pause between successive batches within one type group.
    pub batch_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            throttle_backoff: Duration::from_secs(1),
            batch_delay: Duration::from_millis(100),
        }
    }
}

impl ScanConfig {
    /// Zero-delay variant for tests and local fakes.
    pub fn without_delays(mut self) -> Self {
        self.throttle_backoff = Duration::ZERO;
        self.batch_delay = Duration::ZERO;
        self
    }
}
