//! Production backends over the AWS Resource Groups Tagging API and AWS
//! Config. Clients are built lazily per region and cached; SDK errors are
//! translated into the crate's taxonomy by error code so the engine never
//! sees SDK types.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_config as config_sdk;
use aws_sdk_config::error::ProvideErrorMetadata;
use aws_sdk_resourcegroupstagging as tagging_sdk;
use aws_types::region::Region;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::contract::{ConfigItem, ConfigRegistry, ResourcePage, ResourceTagging};
use crate::error::{DiscoveryError, RegistryError};
use crate::types::{RawResource, TagPair};

const CONNECT_TIMEOUT: u64 = 5;
const READ_TIMEOUT: u64 = 60;
const RESOURCES_PER_PAGE: i32 = 100;

const THROTTLING_CODE: &str = "ThrottlingException";
const VALIDATION_CODE: &str = "ValidationException";

async fn sdk_config(region: &str) -> aws_config::SdkConfig {
    let timeouts = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT))
        .read_timeout(Duration::from_secs(READ_TIMEOUT))
        .build();
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .timeout_config(timeouts)
        .load()
        .await
}

fn describe<E: ProvideErrorMetadata>(err: &E) -> String {
    match (err.code(), err.message()) {
        (Some(code), Some(msg)) => format!("{code}: {msg}"),
        (Some(code), None) => code.to_string(),
        (None, Some(msg)) => msg.to_string(),
        (None, None) => "request dispatch failed".to_string(),
    }
}

/// Tag-filtered listing via `resourcegroupstaggingapi:GetResources`.
pub struct AwsTagging {
    clients: Mutex<HashMap<String, tagging_sdk::Client>>,
}

impl AwsTagging {
    pub fn new() -> Self {
        Self { clients: Mutex::new(HashMap::new()) }
    }

    async fn client(&self, region: &str) -> tagging_sdk::Client {
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(region) {
            return client.clone();
        }
        let client = tagging_sdk::Client::new(&sdk_config(region).await);
        clients.insert(region.to_string(), client.clone());
        client
    }
}

impl Default for AwsTagging {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceTagging for AwsTagging {
    async fn resources_page(
        &self,
        region: &str,
        filters: &[TagPair],
        token: Option<&str>,
    ) -> Result<ResourcePage, DiscoveryError> {
        let client = self.client(region).await;

        let mut req = client.get_resources().resources_per_page(RESOURCES_PER_PAGE);
        for filter in filters {
            req = req.tag_filters(
                tagging_sdk::types::TagFilter::builder()
                    .key(&filter.key)
                    .values(&filter.value)
                    .build(),
            );
        }
        if let Some(t) = token {
            req = req.pagination_token(t);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| DiscoveryError::Service(describe(&e)))?;

        let resources = resp
            .resource_tag_mapping_list()
            .iter()
            .filter_map(|mapping| {
                let identifier = mapping.resource_arn()?.to_string();
                let tags = mapping
                    .tags()
                    .iter()
                    .map(|t| TagPair { key: t.key().to_string(), value: t.value().to_string() })
                    .collect();
                Some(RawResource { identifier, tags })
            })
            .collect();

        Ok(ResourcePage {
            resources,
            next_token: resp.pagination_token().map(str::to_string),
        })
    }
}

/// Configuration lookups via AWS Config: `BatchGetResourceConfig` plus the
/// `SelectResourceConfig` query fallback.
pub struct AwsConfigRegistry {
    clients: Mutex<HashMap<String, config_sdk::Client>>,
}

impl AwsConfigRegistry {
    pub fn new() -> Self {
        Self { clients: Mutex::new(HashMap::new()) }
    }

    async fn client(&self, region: &str) -> config_sdk::Client {
        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(region) {
            return client.clone();
        }
        let client = config_sdk::Client::new(&sdk_config(region).await);
        clients.insert(region.to_string(), client.clone());
        client
    }

    fn registry_error<E: ProvideErrorMetadata>(err: &E) -> RegistryError {
        match err.code() {
            Some(THROTTLING_CODE) => RegistryError::Throttled,
            Some(VALIDATION_CODE) => RegistryError::Unsupported,
            _ => RegistryError::Service(describe(err)),
        }
    }
}

impl Default for AwsConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigRegistry for AwsConfigRegistry {
    async fn batch_get(
        &self,
        region: &str,
        resource_type: &str,
        ids: &[String],
    ) -> Result<Vec<ConfigItem>, RegistryError> {
        let client = self.client(region).await;

        let mut keys = Vec::with_capacity(ids.len());
        for id in ids {
            let key = config_sdk::types::ResourceKey::builder()
                .resource_type(config_sdk::types::ResourceType::from(resource_type))
                .resource_id(id)
                .build()
                .map_err(|e| RegistryError::Service(e.to_string()))?;
            keys.push(key);
        }

        let resp = client
            .batch_get_resource_config()
            .set_resource_keys(Some(keys))
            .send()
            .await
            .map_err(|e| Self::registry_error(&e))?;

        let items = resp
            .base_configuration_items()
            .iter()
            .filter_map(|item| {
                let resource_id = item.resource_id()?.to_string();
                // The configuration body arrives as a JSON string; keep the
                // raw text as a string value if it does not parse.
                let configuration = match item.configuration() {
                    Some(raw) => serde_json::from_str(raw)
                        .unwrap_or_else(|_| Value::String(raw.to_string())),
                    None => Value::Null,
                };
                Some(ConfigItem { resource_id, configuration })
            })
            .collect();

        Ok(items)
    }

    async fn select_by_identifier(
        &self,
        region: &str,
        identifier: &str,
    ) -> Result<Option<Value>, RegistryError> {
        let client = self.client(region).await;

        // Single quotes are doubled so the ARN cannot break out of the
        // query expression.
        let safe = identifier.replace('\'', "''");
        let expression = format!("SELECT * WHERE configuration.arn = '{safe}'");
        debug!(identifier, "querying configuration by identifier");

        let resp = client
            .select_resource_config()
            .expression(expression)
            .send()
            .await
            .map_err(|e| Self::registry_error(&e))?;

        let value = resp.results().first().map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
        });
        Ok(value)
    }
}
