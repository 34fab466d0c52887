use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tagscan::aws::{AwsConfigRegistry, AwsTagging};
use tagscan::{out, run_all, ScanConfig, ScanEngine, ScanStatus, Target, DEFAULT_MAX_PARALLEL};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let targets_path = env_or("TAGSCAN_TARGETS", "targets.json");
    let output_dir = PathBuf::from(env_or("TAGSCAN_OUTPUT", "output"));
    let max_parallel = env_or("TAGSCAN_MAX_PARALLEL", "")
        .parse()
        .unwrap_or(DEFAULT_MAX_PARALLEL);

    let targets = load_targets(&targets_path)?;
    info!(targets = targets.len(), source = %targets_path, "loaded targets");

    let engine = Arc::new(ScanEngine::new(
        AwsTagging::new(),
        AwsConfigRegistry::new(),
        ScanConfig::default(),
    ));
    let outcomes = run_all(engine, targets, max_parallel).await;

    for outcome in &outcomes {
        if let Some(inventory) = &outcome.inventory {
            out::write_inventory(&output_dir, inventory).await?;
        }
    }
    out::print_summary(&outcomes);

    if outcomes.iter().all(|o| o.status == ScanStatus::Failed) {
        anyhow::bail!("all targets failed");
    }
    Ok(())
}

fn load_targets(path: &str) -> Result<Vec<Target>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading target list from {path}"))?;
    let targets: Vec<Target> =
        serde_json::from_str(&raw).with_context(|| format!("parsing target list in {path}"))?;
    anyhow::ensure!(!targets.is_empty(), "no targets defined in {path}");
    for target in &targets {
        target.validate()?;
    }
    Ok(targets)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
