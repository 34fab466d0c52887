//! Service seams for the two backends a scan talks to: the tag-based
//! listing service and the configuration registry.
//!
//! Production implementations live in [`crate::aws`]; tests plug in
//! scripted in-memory fakes. Both traits model single remote calls, so the
//! pagination, batching, and retry policies stay in the engine where they
//! can be exercised without a network.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{DiscoveryError, RegistryError};
use crate::types::{RawResource, TagPair};

/// One page from the tag-filtered listing call.
#[derive(Debug, Clone, Default)]
pub struct ResourcePage {
    pub resources: Vec<RawResource>,
    /// Continuation token; `None` (or empty, which callers normalize away)
    /// means the listing is exhausted.
    pub next_token: Option<String>,
}

/// One item from a batch configuration lookup, keyed by the backend's
/// resource id.
#[derive(Debug, Clone)]
pub struct ConfigItem {
    pub resource_id: String,
    pub configuration: Value,
}

/// Paginated "list resources carrying all of these tags" service.
#[async_trait]
pub trait ResourceTagging: Send + Sync {
    async fn resources_page(
        &self,
        region: &str,
        filters: &[TagPair],
        token: Option<&str>,
    ) -> Result<ResourcePage, DiscoveryError>;
}

/// Configuration registry with a bulk lookup by type+id and a query-style
/// lookup by full identifier.
#[async_trait]
pub trait ConfigRegistry: Send + Sync {
    async fn batch_get(
        &self,
        region: &str,
        resource_type: &str,
        ids: &[String],
    ) -> Result<Vec<ConfigItem>, RegistryError>;

    /// Keyed by the full identifier rather than the bare id, which is more
    /// reliable when ids collide across types or regions. `Ok(None)` means
    /// the registry has no record for this resource.
    async fn select_by_identifier(
        &self,
        region: &str,
        identifier: &str,
    ) -> Result<Option<Value>, RegistryError>;
}
