//! The working set of staged release items.
//!
//! One [`ReleaseWorkingSet`] holds the pending changes for a single package
//! name. Adds go through the merge rules: a change targeting an entity that
//! already has a pending change of the same action family folds into the
//! existing item instead of duplicating it, and contradictory adds are
//! rejected with a user-facing reason. The set round-trips through a
//! [`PackageStore`] as a JSON array of wire items.

use std::fmt;

use relman_store::{PackageStore, StorageResult};
use tracing::warn;

use crate::domain::error::{ReleaseError, Result};
use crate::domain::identity::identity_key;
use crate::domain::item::{EntityType, ReleaseItem};
use crate::obs;
use crate::wire::{self, WireItem};

// ---------------------------------------------------------------------------
// Package names
// ---------------------------------------------------------------------------

/// Storage key for a package's working set.
///
/// The draft package uses the fixed key `releaseItem`; named packages use
/// their backend-assigned name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    pub const DRAFT_KEY: &'static str = "releaseItem";

    /// The draft package being assembled for submission.
    pub fn draft() -> Self {
        PackageName(Self::DRAFT_KEY.to_string())
    }

    /// A previously created package, re-opened by name.
    pub fn named(name: impl Into<String>) -> Self {
        PackageName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_draft(&self) -> bool {
        self.0 == Self::DRAFT_KEY
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Add outcomes
// ---------------------------------------------------------------------------

/// Result of staging one item into the working set.
///
/// Duplicate and contradictory adds are ordinary outcomes surfaced to the
/// user, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item had no same-key counterpart and was appended.
    Added,
    /// The item folded into an existing entry's group lists.
    Merged,
    /// The set was left untouched.
    Rejected(AddRejection),
}

impl AddOutcome {
    /// True when the set changed.
    pub fn accepted(&self) -> bool {
        !matches!(self, AddOutcome::Rejected(_))
    }
}

/// Why an add left the working set untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddRejection {
    /// A same-key entry already covers everything the incoming item names.
    AlreadyInList {
        entity_type: EntityType,
        name: String,
    },
    /// The job is already staged against a different target context.
    ContextMismatch {
        name: String,
        existing: Option<String>,
        incoming: Option<String>,
    },
}

impl fmt::Display for AddRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddRejection::AlreadyInList { entity_type, name } => {
                write!(f, "{} {} exists in list", entity_label(*entity_type), name)
            }
            AddRejection::ContextMismatch {
                name,
                existing,
                incoming,
            } => write!(
                f,
                "Job {} exists in list with a different target context ({} vs {})",
                name,
                existing.as_deref().unwrap_or("none"),
                incoming.as_deref().unwrap_or("none"),
            ),
        }
    }
}

/// Entity label as the console shows it.
fn entity_label(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Job => "Job",
        EntityType::JobGroup => "Hierarchy",
        EntityType::Context => "Context",
        EntityType::ConfigGroup => "Config group",
        EntityType::Batch => "Batch",
    }
}

// ---------------------------------------------------------------------------
// Working set
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated collection of staged release items for one package.
#[derive(Debug, Clone)]
pub struct ReleaseWorkingSet {
    package: PackageName,
    items: Vec<ReleaseItem>,
}

impl ReleaseWorkingSet {
    pub fn new(package: PackageName) -> Self {
        ReleaseWorkingSet {
            package,
            items: Vec::new(),
        }
    }

    pub fn package_name(&self) -> &PackageName {
        &self.package
    }

    pub fn is_draft(&self) -> bool {
        self.package.is_draft()
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[ReleaseItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stage one item, merging into a same-key entry when one exists.
    pub fn add(&mut self, incoming: ReleaseItem) -> AddOutcome {
        let key = identity_key(&incoming);
        let position = self
            .items
            .iter()
            .position(|existing| identity_key(existing) == key);

        let outcome = match position {
            Some(index) => self.merge_at(index, incoming),
            None => {
                self.items.push(incoming);
                AddOutcome::Added
            }
        };

        match &outcome {
            AddOutcome::Added => obs::emit_item_added(self.package.as_str(), &key),
            AddOutcome::Merged => obs::emit_item_merged(self.package.as_str(), &key),
            AddOutcome::Rejected(rejection) => {
                obs::emit_item_rejected(self.package.as_str(), &key, rejection)
            }
        }
        outcome
    }

    /// Merge rules for a same-key collision. The existing entry keeps its
    /// variant kind and non-list fields; only group lists grow.
    fn merge_at(&mut self, index: usize, incoming: ReleaseItem) -> AddOutcome {
        let entity_type = incoming.entity_type();
        let name = incoming.name().to_string();

        match (&mut self.items[index], incoming) {
            (
                ReleaseItem::JobCreateOrUpdate {
                    target_groups,
                    target_context,
                    job_context,
                    ..
                }
                | ReleaseItem::JobUpdateInfo {
                    target_groups,
                    target_context,
                    job_context,
                    ..
                },
                ReleaseItem::JobCreateOrUpdate {
                    target_groups: incoming_groups,
                    target_context: incoming_target,
                    job_context: incoming_job,
                    ..
                }
                | ReleaseItem::JobUpdateInfo {
                    target_groups: incoming_groups,
                    target_context: incoming_target,
                    job_context: incoming_job,
                    ..
                },
            ) => {
                // The effective context is the explicit override, else the
                // job's own context.
                let existing_context = target_context.as_deref().or(job_context.as_deref());
                let incoming_context = incoming_target.as_deref().or(incoming_job.as_deref());
                if existing_context != incoming_context {
                    return AddOutcome::Rejected(AddRejection::ContextMismatch {
                        name,
                        existing: existing_context.map(str::to_string),
                        incoming: incoming_context.map(str::to_string),
                    });
                }
                if union_into(target_groups, incoming_groups) == 0 {
                    return already_in_list(entity_type, name);
                }
                AddOutcome::Merged
            }
            (
                ReleaseItem::JobMove {
                    source_groups,
                    target_groups,
                    ..
                },
                ReleaseItem::JobMove {
                    source_groups: incoming_sources,
                    target_groups: incoming_targets,
                    ..
                },
            ) => {
                let sources_known = incoming_sources.iter().all(|g| source_groups.contains(g));
                let targets_known = incoming_targets.iter().all(|g| target_groups.contains(g));
                if sources_known && targets_known {
                    return already_in_list(entity_type, name);
                }
                union_into(source_groups, incoming_sources);
                union_into(target_groups, incoming_targets);
                AddOutcome::Merged
            }
            (
                ReleaseItem::JobDelete { target_groups, .. },
                ReleaseItem::JobDelete {
                    target_groups: incoming_targets,
                    ..
                },
            ) => {
                if union_into(target_groups, incoming_targets) == 0 {
                    return already_in_list(entity_type, name);
                }
                AddOutcome::Merged
            }
            (
                ReleaseItem::GroupCreateOrUpdate { parent_groups, .. },
                ReleaseItem::GroupCreateOrUpdate {
                    parent_groups: incoming_parents,
                    ..
                },
            ) => {
                if union_into(parent_groups, incoming_parents) == 0 {
                    return already_in_list(entity_type, name);
                }
                AddOutcome::Merged
            }
            (
                ReleaseItem::GroupMove { target_groups, .. },
                ReleaseItem::GroupMove {
                    target_groups: incoming_targets,
                    ..
                },
            ) => {
                if union_into(target_groups, incoming_targets) == 0 {
                    return already_in_list(entity_type, name);
                }
                AddOutcome::Merged
            }
            // Same key with no union fields: group deletes, contexts, config
            // groups, batches.
            _ => already_in_list(entity_type, name),
        }
    }

    /// Remove one item by its internal index.
    pub fn remove_at(&mut self, index: usize) -> Result<ReleaseItem> {
        if index >= self.items.len() {
            return Err(ReleaseError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Wholesale replacement, used when loading a named package.
    pub fn replace_all(&mut self, items: Vec<ReleaseItem>) {
        self.items = items;
    }

    /// Drop every staged item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Rows for display: stable case-insensitive sort by entity type,
    /// descending, so hierarchy, job, context, config group and batch entries
    /// cluster predictably. Each row carries the item's internal index so
    /// callers can remove exactly the row they showed.
    pub fn display_order(&self) -> Vec<(usize, &ReleaseItem)> {
        let mut rows: Vec<(usize, &ReleaseItem)> = self.items.iter().enumerate().collect();
        rows.sort_by(|(_, a), (_, b)| {
            let a = a.entity_type().as_str().to_ascii_lowercase();
            let b = b.entity_type().as_str().to_ascii_lowercase();
            b.cmp(&a)
        });
        rows
    }

    /// Write the set to the store under its package name, wire-shaped.
    pub fn persist(&self, store: &dyn PackageStore) -> StorageResult<()> {
        let encoded = serde_json::to_string(&wire::to_wire(&self.items))?;
        store.put(self.package.as_str(), &encoded)?;
        obs::emit_set_persisted(self.package.as_str(), self.items.len());
        Ok(())
    }

    /// Load a package's working set from the store.
    ///
    /// Total: a missing key restores an empty set; an unreadable store or a
    /// corrupt entry restores an empty set after discarding the entry. The
    /// caller never sees an error.
    pub fn restore(package: PackageName, store: &dyn PackageStore) -> Self {
        let raw = match store.get(package.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ReleaseWorkingSet::new(package),
            Err(err) => {
                warn!(event = "working_set.restore_failed", package = %package, error = %err);
                return ReleaseWorkingSet::new(package);
            }
        };

        match decode_items(&raw) {
            Ok(items) => {
                obs::emit_set_restored(package.as_str(), items.len());
                ReleaseWorkingSet { package, items }
            }
            Err(reason) => {
                obs::emit_entry_discarded(package.as_str(), &reason);
                if let Err(err) = store.remove(package.as_str()) {
                    warn!(event = "working_set.discard_failed", package = %package, error = %err);
                }
                ReleaseWorkingSet::new(package)
            }
        }
    }
}

fn already_in_list(entity_type: EntityType, name: String) -> AddOutcome {
    AddOutcome::Rejected(AddRejection::AlreadyInList { entity_type, name })
}

/// Push each group not already present; returns how many were new.
fn union_into(dest: &mut Vec<String>, incoming: Vec<String>) -> usize {
    let mut added = 0;
    for group in incoming {
        if !dest.contains(&group) {
            dest.push(group);
            added += 1;
        }
    }
    added
}

fn decode_items(raw: &str) -> std::result::Result<Vec<ReleaseItem>, String> {
    let wires: Vec<WireItem> = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    wires
        .into_iter()
        .map(|wire| ReleaseItem::try_from(wire).map_err(|err| err.to_string()))
        .collect()
}
