//! Named package loading.
//!
//! Re-creates working-set items from a stored package's detail. The stored
//! shape leaves two things implicit that staging needs back: a job item's
//! context (snapshotted in the package's job bundles) and a configuration
//! group's category (snapshotted in the config-group bundles). Hydration
//! restores both; missing bundles degrade to no context / default category
//! instead of failing the load.

use tracing::warn;

use relman_store::PackageStore;

use crate::domain::error::Result;
use crate::domain::item::{EntityType, ReleaseAction, ReleaseItem};
use crate::obs;
use crate::services::{PackageDetail, PackageService};
use crate::wire::WireItem;
use crate::working_set::{PackageName, ReleaseWorkingSet};

/// Whether a package is a whole-scheduler bundle rather than an itemized
/// release. Those carry no instructions worth re-staging; only their metadata
/// is shown.
pub fn is_full_scheduler_package(name: &str) -> bool {
    name.contains("scheduler")
}

/// Re-create working-set items from a stored package's detail.
pub fn hydrate_items(detail: &PackageDetail) -> Vec<ReleaseItem> {
    detail
        .release_instructions
        .release_items
        .iter()
        .filter_map(|wire| {
            let enriched = enrich(wire.clone(), detail);
            match ReleaseItem::try_from(enriched) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(
                        event = "package.item_discarded",
                        package = %detail.name,
                        error = %err,
                    );
                    None
                }
            }
        })
        .collect()
}

/// Apply the bundle-derived enrichment to one stored item. Only create/update
/// items carry bundle snapshots.
fn enrich(mut wire: WireItem, detail: &PackageDetail) -> WireItem {
    if wire.action != ReleaseAction::CreateOrUpdate {
        return wire;
    }
    match wire.entity_type {
        EntityType::Job => {
            wire.job_context_name = match &wire.target_context_name {
                Some(target) => Some(target.clone()),
                None => detail
                    .job_bundles
                    .iter()
                    .find(|bundle| bundle.name == wire.name)
                    .and_then(|bundle| bundle.context.as_ref())
                    .map(|context| context.natural_key.clone()),
            };
        }
        EntityType::ConfigGroup => {
            wire.category = Some(
                detail
                    .config_group_bundles
                    .iter()
                    .find(|bundle| bundle.name == wire.name)
                    .and_then(|bundle| bundle.category.clone())
                    .unwrap_or_default(),
            );
        }
        _ => {}
    }
    wire
}

/// Open a named package: fetch its detail, hydrate the items into a working
/// set for that name, and snapshot the set to the session store.
pub async fn open_package(
    service: &dyn PackageService,
    session_store: &dyn PackageStore,
    name: &str,
) -> Result<(ReleaseWorkingSet, PackageDetail)> {
    let detail = service.package_detail(name).await?;
    let items = if is_full_scheduler_package(&detail.name) {
        Vec::new()
    } else {
        hydrate_items(&detail)
    };

    let mut set = ReleaseWorkingSet::new(PackageName::named(name));
    set.replace_all(items);
    set.persist(session_store)?;
    obs::emit_package_opened(name, set.len());
    Ok((set, detail))
}

/// Copy a named package's hydrated items into the draft working set and
/// persist them to the durable store.
pub async fn clone_into_draft(
    service: &dyn PackageService,
    draft_store: &dyn PackageStore,
    name: &str,
) -> Result<ReleaseWorkingSet> {
    let detail = service.package_detail(name).await?;
    let mut set = ReleaseWorkingSet::new(PackageName::draft());
    set.replace_all(hydrate_items(&detail));
    set.persist(draft_store)?;
    obs::emit_package_cloned(name, set.len());
    Ok(set)
}
