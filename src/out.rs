//! Operator-facing output: per-target inventory files and the end-of-run
//! summary. The JSON file layout is the contract the downstream document
//! generator consumes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::types::{ResourceInventory, ScanOutcome, ScanStatus};

/// Write one target's inventory to `<output_dir>/<target>/inventory.json`
/// and return the file path.
pub async fn write_inventory(output_dir: &Path, inventory: &ResourceInventory) -> Result<PathBuf> {
    let target_dir = output_dir.join(sanitize_name(&inventory.target_name));
    tokio::fs::create_dir_all(&target_dir)
        .await
        .with_context(|| format!("creating output directory {}", target_dir.display()))?;

    let path = target_dir.join("inventory.json");
    let body = serde_json::to_string_pretty(inventory)?;
    tokio::fs::write(&path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!(target = %inventory.target_name, path = %path.display(), "inventory written");
    Ok(path)
}

/// Log one line per outcome plus the success/failure totals.
pub fn print_summary(outcomes: &[ScanOutcome]) {
    let mut successful = 0usize;
    let mut failed = 0usize;

    for outcome in outcomes {
        match outcome.status {
            ScanStatus::Success => {
                successful += 1;
                let resources = outcome
                    .inventory
                    .as_ref()
                    .map(|inv| inv.resources.len())
                    .unwrap_or(0);
                info!(target = %outcome.target_name, resources, "target scanned");
            }
            ScanStatus::Failed => {
                failed += 1;
                error!(
                    target = %outcome.target_name,
                    error = outcome.error.as_deref().unwrap_or("unknown error"),
                    "target failed"
                );
            }
        }
    }

    info!(total = outcomes.len(), successful, failed, "all targets processed");
}

fn sanitize_name(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}
