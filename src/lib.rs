//! Tag-driven AWS resource inventory scanner.
//!
//! Discovers every resource carrying a target's tag set through the
//! Resource Groups Tagging API, classifies each ARN into a canonical
//! resource type, hydrates configurations from AWS Config (bulk lookups
//! with a per-resource query fallback), and runs multiple targets under a
//! bounded worker pool. The resulting [`types::ResourceInventory`] JSON is
//! the contract consumed by downstream documentation tooling.

pub mod arn;
pub mod aws;
pub mod config;
pub mod contract;
pub mod discover;
pub mod error;
pub mod hydrate;
pub mod orchestrate;
pub mod out;
pub mod scan;
pub mod types;

pub use config::{ScanConfig, DEFAULT_MAX_PARALLEL};
pub use error::{DiscoveryError, RegistryError, ScanError};
pub use orchestrate::run_all;
pub use scan::ScanEngine;
pub use types::{
    RawResource, ResourceInventory, ResourceRecord, ScanOutcome, ScanStatus, TagPair, Target,
};
