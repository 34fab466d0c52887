use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One required tag on a target, and the tag shape reported back on
/// discovered resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
    pub key: String,
    pub value: String,
}

/// A named application/environment to scan: every resource carrying all of
/// `tags` in `region` belongs to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub region: String,
    pub tags: Vec<TagPair>,
}

impl Target {
    /// The config layer feeding targets in is expected to have validated
    /// them; the binary calls this to enforce it.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("target has an empty name");
        }
        if self.tags.is_empty() {
            bail!("target '{}' has no tags to filter on", self.name);
        }
        Ok(())
    }
}

/// A discovered resource before configuration hydration: just the ARN and
/// the tags the tagging API reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResource {
    pub identifier: String,
    pub tags: Vec<TagPair>,
}

/// A hydrated inventory entry. `configuration` stays `None` when both the
/// batch path and the per-resource fallback came up empty; that is a valid
/// terminal state, not an error.
///
/// Field names are a stable contract with the downstream document
/// generator: `identifier`, `tags`, `type`, `configuration` (null, never
/// omitted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub identifier: String,
    pub tags: Vec<TagPair>,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub configuration: Option<Value>,
}

/// The engine's output for one target. Never mutated after `scan` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInventory {
    pub target_name: String,
    pub resources: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Success,
    Failed,
}

/// Per-target result from the orchestrator. Exactly one of `inventory` and
/// `error` is set, depending on `status`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub target_name: String,
    pub status: ScanStatus,
    pub inventory: Option<ResourceInventory>,
    pub error: Option<String>,
}

impl ScanOutcome {
    pub fn success(inventory: ResourceInventory) -> Self {
        Self {
            target_name: inventory.target_name.clone(),
            status: ScanStatus::Success,
            inventory: Some(inventory),
            error: None,
        }
    }

    pub fn failure(target_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            status: ScanStatus::Failed,
            inventory: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_without_tags_is_rejected() {
        let t = Target {
            name: "web".into(),
            region: "us-east-1".into(),
            tags: vec![],
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn target_with_blank_name_is_rejected() {
        let t = Target {
            name: "  ".into(),
            region: "us-east-1".into(),
            tags: vec![TagPair { key: "app".into(), value: "web".into() }],
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn record_serializes_with_downstream_field_names() {
        let rec = ResourceRecord {
            identifier: "arn:aws:ec2:us-east-1:123:instance/i-1".into(),
            tags: vec![TagPair { key: "app".into(), value: "web".into() }],
            resource_type: "AWS::EC2::Instance".into(),
            configuration: None,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "AWS::EC2::Instance");
        assert!(json["configuration"].is_null());
        assert_eq!(json["tags"][0]["key"], "app");
    }
}
