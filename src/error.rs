use thiserror::Error;

/// Fatal listing failure. A broken or partial tag-filtered listing could
/// silently omit resources, so the whole target scan aborts rather than
/// returning a partial inventory.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("tagging service error: {0}")]
    Service(String),
}

/// Failures from the configuration registry. All variants are absorbed
/// inside the hydrator; none abort a scan.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Rate limited; retried exactly once after a fixed backoff.
    #[error("configuration registry throttled the request")]
    Throttled,
    /// Batch lookups are not supported for this resource type; the whole
    /// batch reroutes to the per-resource fallback.
    #[error("resource type not supported by batch lookup")]
    Unsupported,
    #[error("configuration registry error: {0}")]
    Service(String),
}

/// Engine-level failure for one target.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("resource discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
}
