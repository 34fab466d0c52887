//! Multi-target orchestration over a bounded worker pool.
//!
//! Each target scans independently; one target's failure (or panic) never
//! disturbs its siblings, and the result set carries exactly one outcome
//! per requested target. Ordering follows completion, not input.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::config::DEFAULT_MAX_PARALLEL;
use crate::contract::{ConfigRegistry, ResourceTagging};
use crate::scan::ScanEngine;
use crate::types::{ScanOutcome, Target};

/// Scan all targets with at most `max_parallel` in flight. A bound of zero
/// is treated as [`DEFAULT_MAX_PARALLEL`].
pub async fn run_all<L, R>(
    engine: Arc<ScanEngine<L, R>>,
    targets: Vec<Target>,
    max_parallel: usize,
) -> Vec<ScanOutcome>
where
    L: ResourceTagging + 'static,
    R: ConfigRegistry + 'static,
{
    // Pool setup is pointless for one unit of work.
    if let [target] = targets.as_slice() {
        return vec![scan_one(&engine, target).await];
    }

    let max_parallel = if max_parallel == 0 { DEFAULT_MAX_PARALLEL } else { max_parallel };
    info!(targets = targets.len(), max_parallel, "scanning targets");

    let semaphore = Arc::new(Semaphore::new(max_parallel));
    let (names, handles): (Vec<_>, Vec<_>) = targets
        .into_iter()
        .map(|target| {
            let name = target.name.clone();
            let engine = Arc::clone(&engine);
            let semaphore = Arc::clone(&semaphore);
            let handle = tokio::spawn(async move {
                // Closed only on shutdown; stop taking on new work then.
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ScanOutcome::failure(&target.name, "scan pool shut down");
                    }
                };
                scan_one(&engine, &target).await
            });
            (name, handle)
        })
        .unzip();

    // Every spawned task yields exactly one outcome; a panicking scan is
    // captured here instead of aborting its siblings.
    let mut outcomes = Vec::with_capacity(handles.len());
    for (target_name, result) in names.into_iter().zip(join_all(handles).await) {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(join_err) => {
                error!(target = %target_name, %join_err, "scan task aborted");
                outcomes.push(ScanOutcome::failure(target_name, join_err.to_string()));
            }
        }
    }
    outcomes
}

async fn scan_one<L, R>(engine: &ScanEngine<L, R>, target: &Target) -> ScanOutcome
where
    L: ResourceTagging,
    R: ConfigRegistry,
{
    match engine.scan(target).await {
        Ok(inventory) => ScanOutcome::success(inventory),
        Err(err) => {
            error!(target = %target.name, %err, "scan failed");
            ScanOutcome::failure(&target.name, err.to_string())
        }
    }
}
