//! One-target scan: discovery followed by hydration.

use tracing::info;

use crate::config::ScanConfig;
use crate::contract::{ConfigRegistry, ResourceTagging};
use crate::discover;
use crate::error::ScanError;
use crate::hydrate::ConfigHydrator;
use crate::types::{ResourceInventory, Target};

pub struct ScanEngine<L, R> {
    lister: L,
    hydrator: ConfigHydrator<R>,
}

impl<L, R> ScanEngine<L, R>
where
    L: ResourceTagging,
    R: ConfigRegistry,
{
    pub fn new(lister: L, registry: R, config: ScanConfig) -> Self {
        Self {
            lister,
            hydrator: ConfigHydrator::new(registry, config),
        }
    }

    /// Produce the target's inventory. A discovery failure aborts the scan;
    /// hydration degrades per resource and never fails.
    pub async fn scan(&self, target: &Target) -> Result<ResourceInventory, ScanError> {
        info!(target = %target.name, region = %target.region, "starting scan");

        let raw = discover::list_tagged_resources(&self.lister, &target.region, &target.tags)
            .await?;
        if raw.is_empty() {
            return Ok(ResourceInventory {
                target_name: target.name.clone(),
                resources: Vec::new(),
            });
        }

        let found = raw.len();
        let resources = self.hydrator.hydrate(&target.region, raw).await;
        info!(
            target = %target.name,
            discovered = found,
            inventoried = resources.len(),
            "scan complete"
        );
        Ok(ResourceInventory {
            target_name: target.name.clone(),
            resources,
        })
    }
}
