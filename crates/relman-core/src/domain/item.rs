//! Release item model.
//!
//! A release item is one staged change bound for the scheduler backend: a
//! job, hierarchy node, context, configuration group, or batch, combined
//! with the action to perform on it. Only the combinations a release can
//! actually express are representable; every variant carries exactly the
//! fields its action needs.

use serde::{Deserialize, Serialize};

use crate::domain::category::ConfigCategory;

// ---------------------------------------------------------------------------
// Entity types and actions (wire vocabulary)
// ---------------------------------------------------------------------------

/// Kind of entity a release item targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Job,
    JobGroup,
    Context,
    ConfigGroup,
    Batch,
}

impl EntityType {
    /// Wire string, as the backend expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Job => "JOB",
            EntityType::JobGroup => "JOB_GROUP",
            EntityType::Context => "CONTEXT",
            EntityType::ConfigGroup => "CONFIG_GROUP",
            EntityType::Batch => "BATCH",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action a release item performs on its entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseAction {
    CreateOrUpdate,
    UpdateJobInfo,
    Move,
    Delete,
}

impl ReleaseAction {
    /// Wire string, as the backend expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseAction::CreateOrUpdate => "CREATE_OR_UPDATE",
            ReleaseAction::UpdateJobInfo => "UPDATE_JOB_INFO",
            ReleaseAction::Move => "MOVE",
            ReleaseAction::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Release items
// ---------------------------------------------------------------------------

/// One staged change in a release package.
///
/// Group name lists (`target_groups`, `source_groups`, `parent_groups`) are
/// ordered sets: insertion order is preserved and the working-set merge rules
/// keep them duplicate-free. A job or group may belong to, or move between,
/// several hierarchies at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseItem {
    /// Upload a job definition into one or more hierarchy nodes.
    JobCreateOrUpdate {
        name: String,
        target_groups: Vec<String>,
        /// Explicit context to release the job into. When set, the job's own
        /// context is left untouched by the release.
        target_context: Option<String>,
        /// The job's own context, carried for display and audit.
        job_context: Option<String>,
    },
    /// Update job metadata without re-uploading its definition.
    JobUpdateInfo {
        name: String,
        target_groups: Vec<String>,
        target_context: Option<String>,
        job_context: Option<String>,
    },
    /// Move a job out of some hierarchy nodes and into others.
    JobMove {
        name: String,
        source_groups: Vec<String>,
        target_groups: Vec<String>,
    },
    /// Remove a job from the named hierarchy nodes.
    JobDelete {
        name: String,
        target_groups: Vec<String>,
    },
    /// Create a hierarchy node, or re-parent it under the named parents.
    /// Empty `parent_groups` attaches the node at the root.
    GroupCreateOrUpdate {
        name: String,
        parent_groups: Vec<String>,
        /// Release the node itself without bundling its member jobs.
        group_only: bool,
    },
    /// Move a hierarchy node under the named parents.
    GroupMove {
        name: String,
        target_groups: Vec<String>,
        group_only: bool,
    },
    /// Delete a hierarchy node.
    GroupDelete { name: String },
    /// Release a job context definition.
    ContextCreateOrUpdate { name: String },
    /// Release a configuration group.
    ConfigGroupCreateOrUpdate {
        name: String,
        category: ConfigCategory,
    },
    /// Release a batch definition.
    BatchCreateOrUpdate { name: String },
}

impl ReleaseItem {
    /// Name of the targeted entity.
    pub fn name(&self) -> &str {
        match self {
            ReleaseItem::JobCreateOrUpdate { name, .. }
            | ReleaseItem::JobUpdateInfo { name, .. }
            | ReleaseItem::JobMove { name, .. }
            | ReleaseItem::JobDelete { name, .. }
            | ReleaseItem::GroupCreateOrUpdate { name, .. }
            | ReleaseItem::GroupMove { name, .. }
            | ReleaseItem::GroupDelete { name }
            | ReleaseItem::ContextCreateOrUpdate { name }
            | ReleaseItem::ConfigGroupCreateOrUpdate { name, .. }
            | ReleaseItem::BatchCreateOrUpdate { name } => name,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            ReleaseItem::JobCreateOrUpdate { .. }
            | ReleaseItem::JobUpdateInfo { .. }
            | ReleaseItem::JobMove { .. }
            | ReleaseItem::JobDelete { .. } => EntityType::Job,
            ReleaseItem::GroupCreateOrUpdate { .. }
            | ReleaseItem::GroupMove { .. }
            | ReleaseItem::GroupDelete { .. } => EntityType::JobGroup,
            ReleaseItem::ContextCreateOrUpdate { .. } => EntityType::Context,
            ReleaseItem::ConfigGroupCreateOrUpdate { .. } => EntityType::ConfigGroup,
            ReleaseItem::BatchCreateOrUpdate { .. } => EntityType::Batch,
        }
    }

    pub fn action(&self) -> ReleaseAction {
        match self {
            ReleaseItem::JobCreateOrUpdate { .. }
            | ReleaseItem::GroupCreateOrUpdate { .. }
            | ReleaseItem::ContextCreateOrUpdate { .. }
            | ReleaseItem::ConfigGroupCreateOrUpdate { .. }
            | ReleaseItem::BatchCreateOrUpdate { .. } => ReleaseAction::CreateOrUpdate,
            ReleaseItem::JobUpdateInfo { .. } => ReleaseAction::UpdateJobInfo,
            ReleaseItem::JobMove { .. } | ReleaseItem::GroupMove { .. } => ReleaseAction::Move,
            ReleaseItem::JobDelete { .. } | ReleaseItem::GroupDelete { .. } => {
                ReleaseAction::Delete
            }
        }
    }

    /// One-line human description of the staged change, shown in package
    /// listings.
    pub fn summary(&self) -> String {
        match self {
            ReleaseItem::JobCreateOrUpdate {
                name,
                target_groups,
                target_context,
                job_context,
            } => {
                let context = target_context
                    .as_deref()
                    .or(job_context.as_deref())
                    .unwrap_or("");
                let mut row = format!(
                    "(Target Hierarchy) {} -> (Job Name) {} : (Context) {}",
                    target_groups.join(","),
                    name,
                    context,
                );
                if target_context.is_some() {
                    row.push_str(" (will not be covered)");
                }
                row
            }
            ReleaseItem::JobUpdateInfo {
                name,
                target_groups,
                target_context,
                job_context,
            } => {
                let mut row = format!(
                    "(Target Hierarchy) {} -> (Job Name) {} : (Context) {}",
                    target_groups.join(","),
                    name,
                    job_context.as_deref().unwrap_or(""),
                );
                if target_context.is_some() {
                    row.push_str(" (will not be covered)");
                }
                row
            }
            ReleaseItem::JobMove {
                name,
                source_groups,
                target_groups,
            } => format!(
                "(Move Out) {} -> (Move In) {} -> (Job Name) {}",
                source_groups.join(","),
                target_groups.join(","),
                name,
            ),
            ReleaseItem::JobDelete {
                name,
                target_groups,
            } => format!("{} -> {}", target_groups.join(","), name),
            ReleaseItem::GroupCreateOrUpdate {
                name,
                parent_groups,
                ..
            } => format!(
                "(Parent) {} -> (Child) {}",
                join_or_root(parent_groups),
                name,
            ),
            ReleaseItem::GroupMove {
                name,
                target_groups,
                ..
            } => format!(
                "(Parent) {} -> (Child) {}",
                join_or_root(target_groups),
                name,
            ),
            ReleaseItem::GroupDelete { name } => format!("_Trash -> {}", name),
            ReleaseItem::ContextCreateOrUpdate { name } => name.clone(),
            ReleaseItem::ConfigGroupCreateOrUpdate { name, category } => {
                format!("(Category) {} -> (Name) {}", category, name)
            }
            ReleaseItem::BatchCreateOrUpdate { name } => format!("(Batch) {}", name),
        }
    }
}

fn join_or_root(groups: &[String]) -> String {
    if groups.is_empty() {
        "Root".to_string()
    } else {
        groups.join(",")
    }
}
