//! Tag-filtered resource discovery: drains the paginated listing into one
//! complete sequence. Hydration needs the full type distribution up front,
//! so no streaming here.

use tracing::{debug, warn};

use crate::contract::ResourceTagging;
use crate::error::DiscoveryError;
use crate::types::{RawResource, TagPair};

/// List every resource carrying all of `filters` in `region`.
///
/// A hard error on any page aborts the whole listing; pages fetched so far
/// are discarded, since a partial tag-filtered list can silently omit
/// resources. An empty result is valid and only logged.
pub async fn list_tagged_resources<L: ResourceTagging>(
    lister: &L,
    region: &str,
    filters: &[TagPair],
) -> Result<Vec<RawResource>, DiscoveryError> {
    let mut out: Vec<RawResource> = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = lister
            .resources_page(region, filters, token.as_deref())
            .await?;
        debug!(region, page_len = page.resources.len(), "fetched listing page");
        out.extend(page.resources);

        token = page.next_token.filter(|t| !t.is_empty());
        if token.is_none() {
            break;
        }
    }

    if out.is_empty() {
        warn!(region, "no resources matched the tag filters");
    }
    Ok(out)
}
