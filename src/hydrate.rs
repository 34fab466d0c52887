//! Configuration hydration: enrich discovered resources with their full
//! configuration from the registry.
//!
//! Hydration never fails a scan. Every upstream error degrades to
//! `configuration = None` on the affected records; a missing configuration
//! detail must not block the rest of the inventory. The batch loop is
//! single-threaded with explicit delays so backoff accounting stays local;
//! cross-target concurrency belongs to the orchestrator.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::arn;
use crate::config::ScanConfig;
use crate::contract::ConfigRegistry;
use crate::error::RegistryError;
use crate::types::{RawResource, ResourceRecord};

pub struct ConfigHydrator<R> {
    registry: R,
    config: ScanConfig,
}

impl<R: ConfigRegistry> ConfigHydrator<R> {
    pub fn new(registry: R, config: ScanConfig) -> Self {
        Self { registry, config }
    }

    /// Hydrate every resource, preserving discovery order. Resources whose
    /// identifier cannot be classified are dropped with a warning; all
    /// others come back as a record, with or without configuration.
    pub async fn hydrate(&self, region: &str, resources: Vec<RawResource>) -> Vec<ResourceRecord> {
        if resources.is_empty() {
            return Vec::new();
        }

        let mut classified: Vec<(RawResource, String)> = Vec::with_capacity(resources.len());
        for res in resources {
            let resource_type = arn::classify(&res.identifier);
            if resource_type == arn::UNKNOWN_TYPE {
                warn!(identifier = %res.identifier, "dropping resource with malformed identifier");
                continue;
            }
            classified.push((res, resource_type));
        }

        // BTreeMap keeps the per-type processing order deterministic.
        let mut groups: BTreeMap<&str, Vec<&RawResource>> = BTreeMap::new();
        for (res, resource_type) in &classified {
            groups.entry(resource_type.as_str()).or_default().push(res);
        }
        info!(
            region,
            resources = classified.len(),
            types = groups.len(),
            "hydrating configurations"
        );

        let mut configs: HashMap<String, Value> = HashMap::new();
        for (resource_type, group) in &groups {
            debug!(resource_type, count = group.len(), "processing type group");
            let mut batch_supported = true;

            for (i, batch) in group.chunks(self.config.batch_size).enumerate() {
                if i > 0 {
                    tokio::time::sleep(self.config.batch_delay).await;
                }
                if batch_supported {
                    match self.hydrate_batch(region, resource_type, batch, &mut configs).await {
                        BatchResult::Done => continue,
                        BatchResult::Unsupported => {
                            info!(resource_type, "batch lookup unsupported, using query fallback");
                            batch_supported = false;
                        }
                        BatchResult::Failed => {}
                    }
                }
                for res in batch {
                    self.hydrate_one(region, res, &mut configs).await;
                }
            }
        }

        classified
            .into_iter()
            .map(|(res, resource_type)| {
                let configuration = configs.remove(&res.identifier);
                ResourceRecord {
                    identifier: res.identifier,
                    tags: res.tags,
                    resource_type,
                    configuration,
                }
            })
            .collect()
    }

    /// One bulk lookup. Matched items land in `configs`; resources the
    /// response did not cover fall through to the per-resource query.
    async fn hydrate_batch(
        &self,
        region: &str,
        resource_type: &str,
        batch: &[&RawResource],
        configs: &mut HashMap<String, Value>,
    ) -> BatchResult {
        let ids: Vec<String> = batch
            .iter()
            .filter_map(|r| arn::resource_id(&r.identifier))
            .collect();

        match self.registry.batch_get(region, resource_type, &ids).await {
            Ok(items) => {
                let mut by_id: HashMap<String, Value> = items
                    .into_iter()
                    .map(|item| (item.resource_id, item.configuration))
                    .collect();
                for res in batch {
                    let matched = arn::resource_id(&res.identifier)
                        .and_then(|id| by_id.remove(&id));
                    match matched {
                        Some(value) => {
                            configs.insert(res.identifier.clone(), value);
                        }
                        None => self.hydrate_one(region, res, configs).await,
                    }
                }
                BatchResult::Done
            }
            Err(RegistryError::Unsupported) => BatchResult::Unsupported,
            Err(err) => {
                // Resolved the mid-batch ambiguity the safe way: the whole
                // batch reroutes to the per-resource query.
                warn!(resource_type, %err, "batch lookup failed, falling back per resource");
                BatchResult::Failed
            }
        }
    }

    /// Query-style lookup keyed by the full identifier, with exactly one
    /// retry after a throttle signal. Any remaining failure leaves the
    /// configuration absent.
    async fn hydrate_one(
        &self,
        region: &str,
        res: &RawResource,
        configs: &mut HashMap<String, Value>,
    ) {
        match self.registry.select_by_identifier(region, &res.identifier).await {
            Ok(Some(value)) => {
                configs.insert(res.identifier.clone(), value);
            }
            Ok(None) => {
                debug!(identifier = %res.identifier, "registry has no configuration record");
            }
            Err(RegistryError::Throttled) => {
                warn!(identifier = %res.identifier, "throttled fetching configuration, retrying");
                tokio::time::sleep(self.config.throttle_backoff).await;
                match self.registry.select_by_identifier(region, &res.identifier).await {
                    Ok(Some(value)) => {
                        configs.insert(res.identifier.clone(), value);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        error!(identifier = %res.identifier, %err, "configuration fetch failed after retry");
                    }
                }
            }
            Err(err) => {
                error!(identifier = %res.identifier, %err, "configuration fetch failed");
            }
        }
    }
}

enum BatchResult {
    Done,
    Unsupported,
    Failed,
}
