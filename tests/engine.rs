//! End-to-end tests for the scan engine and the multi-target orchestrator,
//! running against scripted in-memory backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use tagscan::contract::{ConfigItem, ConfigRegistry, ResourcePage, ResourceTagging};
use tagscan::{
    run_all, DiscoveryError, RawResource, RegistryError, ScanConfig, ScanEngine, ScanStatus,
    TagPair, Target,
};

/// Tag listing fake: resources keyed by the value of the `app` tag filter,
/// with an optional set of app values whose listing always fails. Pages are
/// capped at 2 resources to exercise the pagination loop.
struct FakeTagging {
    by_app: HashMap<String, Vec<RawResource>>,
    failing_apps: Vec<String>,
    page_size: usize,
}

#[async_trait]
impl ResourceTagging for FakeTagging {
    async fn resources_page(
        &self,
        _region: &str,
        filters: &[TagPair],
        token: Option<&str>,
    ) -> Result<ResourcePage, DiscoveryError> {
        let app = filters
            .iter()
            .find(|f| f.key == "app")
            .map(|f| f.value.clone())
            .unwrap_or_default();
        if self.failing_apps.contains(&app) {
            return Err(DiscoveryError::Service("AccessDenied: not authorized".into()));
        }

        let all = self.by_app.get(&app).cloned().unwrap_or_default();
        let offset: usize = token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = (offset + self.page_size).min(all.len());
        let next_token = (end < all.len()).then(|| end.to_string());
        Ok(ResourcePage { resources: all[offset..end].to_vec(), next_token })
    }
}

/// Registry fake answering every batch lookup. Counters are shared `Arc`s
/// so tests keep visibility after the fake moves into the engine.
#[derive(Default)]
struct FakeRegistry {
    batch_calls: Arc<Mutex<usize>>,
    fallback_calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl ConfigRegistry for FakeRegistry {
    async fn batch_get(
        &self,
        _region: &str,
        resource_type: &str,
        ids: &[String],
    ) -> Result<Vec<ConfigItem>, RegistryError> {
        *self.batch_calls.lock().unwrap() += 1;
        Ok(ids
            .iter()
            .map(|id| ConfigItem {
                resource_id: id.clone(),
                configuration: json!({"resourceId": id, "resourceType": resource_type}),
            })
            .collect())
    }

    async fn select_by_identifier(
        &self,
        _region: &str,
        identifier: &str,
    ) -> Result<Option<Value>, RegistryError> {
        *self.fallback_calls.lock().unwrap() += 1;
        Ok(Some(json!({"arn": identifier})))
    }
}

fn instance(app: &str, n: usize) -> RawResource {
    RawResource {
        identifier: format!("arn:aws:ec2:us-east-1:123:instance/i-{app}-{n:03}"),
        tags: vec![TagPair { key: "app".into(), value: app.into() }],
    }
}

fn target(app: &str) -> Target {
    Target {
        name: app.to_string(),
        region: "us-east-1".into(),
        tags: vec![TagPair { key: "app".into(), value: app.into() }],
    }
}

struct RegistryCounters {
    batch_calls: Arc<Mutex<usize>>,
    fallback_calls: Arc<Mutex<usize>>,
}

fn engine_with(
    by_app: HashMap<String, Vec<RawResource>>,
    failing_apps: Vec<String>,
) -> (Arc<ScanEngine<FakeTagging, FakeRegistry>>, RegistryCounters) {
    let tagging = FakeTagging { by_app, failing_apps, page_size: 2 };
    let registry = FakeRegistry::default();
    let counters = RegistryCounters {
        batch_calls: Arc::clone(&registry.batch_calls),
        fallback_calls: Arc::clone(&registry.fallback_calls),
    };
    let engine = Arc::new(ScanEngine::new(
        tagging,
        registry,
        ScanConfig::default().without_delays(),
    ));
    (engine, counters)
}

#[tokio::test]
async fn scan_produces_a_hydrated_inventory() {
    let by_app = HashMap::from([("web".to_string(), (0..5).map(|n| instance("web", n)).collect())]);
    let (engine, counters) = engine_with(by_app, vec![]);

    let inventory = engine.scan(&target("web")).await.unwrap();
    // 5 instances at batch size 20: one bulk call, no fallback.
    assert_eq!(*counters.batch_calls.lock().unwrap(), 1);
    assert_eq!(*counters.fallback_calls.lock().unwrap(), 0);
    assert_eq!(inventory.target_name, "web");
    assert_eq!(inventory.resources.len(), 5);
    for record in &inventory.resources {
        assert_eq!(record.resource_type, "AWS::EC2::Instance");
        assert!(record.configuration.is_some());
    }
}

#[tokio::test]
async fn empty_listing_short_circuits_without_hydration() {
    let (engine, counters) = engine_with(HashMap::new(), vec![]);

    let inventory = engine.scan(&target("ghost")).await.unwrap();
    assert!(inventory.resources.is_empty());
    assert_eq!(*counters.batch_calls.lock().unwrap(), 0);
    assert_eq!(*counters.fallback_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn discovery_failure_aborts_the_scan() {
    let (engine, _) = engine_with(HashMap::new(), vec!["web".into()]);
    let err = engine.scan(&target("web")).await.unwrap_err();
    assert!(err.to_string().contains("AccessDenied"));
}

#[tokio::test]
async fn scanning_twice_yields_the_same_configuration_mapping() {
    let by_app = HashMap::from([("web".to_string(), (0..7).map(|n| instance("web", n)).collect())]);
    let (engine, _) = engine_with(by_app, vec![]);

    let first = engine.scan(&target("web")).await.unwrap();
    let second = engine.scan(&target("web")).await.unwrap();

    let as_map = |inv: &tagscan::ResourceInventory| -> HashMap<String, Option<Value>> {
        inv.resources
            .iter()
            .map(|r| (r.identifier.clone(), r.configuration.clone()))
            .collect()
    };
    assert_eq!(as_map(&first), as_map(&second));
}

#[tokio::test]
async fn run_all_isolates_a_failing_target() {
    let mut by_app = HashMap::new();
    for i in 1..=5 {
        let app = format!("t{i}");
        by_app.insert(app.clone(), (0..3).map(|n| instance(&app, n)).collect());
    }
    let (engine, _) = engine_with(by_app, vec!["t3".into()]);
    let targets: Vec<Target> = (1..=5).map(|i| target(&format!("t{i}"))).collect();

    let mut outcomes = run_all(engine, targets, 2).await;
    assert_eq!(outcomes.len(), 5);

    // Completion order is unspecified; re-sort by target name.
    outcomes.sort_by(|a, b| a.target_name.cmp(&b.target_name));
    for outcome in &outcomes {
        if outcome.target_name == "t3" {
            assert_eq!(outcome.status, ScanStatus::Failed);
            assert!(outcome.error.as_deref().unwrap().contains("AccessDenied"));
            assert!(outcome.inventory.is_none());
        } else {
            assert_eq!(outcome.status, ScanStatus::Success);
            assert!(outcome.error.is_none());
            assert_eq!(outcome.inventory.as_ref().unwrap().resources.len(), 3);
        }
    }
}

#[tokio::test]
async fn run_all_with_one_target_skips_the_pool() {
    let by_app = HashMap::from([("web".to_string(), vec![instance("web", 0)])]);
    let (engine, _) = engine_with(by_app, vec![]);

    let outcomes = run_all(engine, vec![target("web")], 4).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, ScanStatus::Success);
}

#[tokio::test]
async fn run_all_with_zero_bound_still_scans() {
    let by_app = HashMap::from([
        ("a".to_string(), vec![instance("a", 0)]),
        ("b".to_string(), vec![instance("b", 0)]),
    ]);
    let (engine, _) = engine_with(by_app, vec![]);

    let outcomes = run_all(engine, vec![target("a"), target("b")], 0).await;
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == ScanStatus::Success));
}
