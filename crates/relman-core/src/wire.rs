//! Wire form of release items.
//!
//! [`WireItem`] is the flat JSON shape the backend accepts and the shape the
//! persisted draft uses. Deserialization is tolerant of older stored drafts:
//! absent or `null` group lists read as empty, absent flags as `false`, and
//! empty-string contexts normalize to `None`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::category::ConfigCategory;
use crate::domain::item::{EntityType, ReleaseAction, ReleaseItem};

/// A release item as serialized for the backend and for persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireItem {
    pub action: ReleaseAction,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub operate_job_group_only: bool,
    #[serde(default, deserialize_with = "null_to_default")]
    pub target_group_names: Vec<String>,
    #[serde(default)]
    pub target_context_name: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub source_group_names: Vec<String>,
    #[serde(default)]
    pub job_context_name: Option<String>,
    /// Client-side bookkeeping for configuration groups; omitted when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ConfigCategory>,
}

/// Accept `null` where older drafts stored it instead of omitting the field.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<&ReleaseItem> for WireItem {
    fn from(item: &ReleaseItem) -> Self {
        let base = WireItem {
            action: item.action(),
            entity_type: item.entity_type(),
            name: item.name().to_string(),
            operate_job_group_only: false,
            target_group_names: Vec::new(),
            target_context_name: None,
            source_group_names: Vec::new(),
            job_context_name: None,
            category: None,
        };

        match item {
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
            } => WireItem {
                target_group_names: target_groups.clone(),
                target_context_name: target_context.clone(),
                job_context_name: job_context.clone(),
                ..base
            },
            ReleaseItem::JobMove {
                source_groups,
                target_groups,
                ..
            } => WireItem {
                source_group_names: source_groups.clone(),
                target_group_names: target_groups.clone(),
                ..base
            },
            ReleaseItem::JobDelete { target_groups, .. } => WireItem {
                target_group_names: target_groups.clone(),
                ..base
            },
            ReleaseItem::GroupCreateOrUpdate {
                parent_groups,
                group_only,
                ..
            } => WireItem {
                target_group_names: parent_groups.clone(),
                operate_job_group_only: *group_only,
                ..base
            },
            ReleaseItem::GroupMove {
                target_groups,
                group_only,
                ..
            } => WireItem {
                target_group_names: target_groups.clone(),
                operate_job_group_only: *group_only,
                ..base
            },
            ReleaseItem::GroupDelete { .. }
            | ReleaseItem::ContextCreateOrUpdate { .. }
            | ReleaseItem::BatchCreateOrUpdate { .. } => base,
            ReleaseItem::ConfigGroupCreateOrUpdate { category, .. } => WireItem {
                category: Some(category.clone()),
                ..base
            },
        }
    }
}

/// A `(type, action)` pair no release can express.
#[derive(Debug, thiserror::Error)]
#[error("unsupported item combination: {entity_type} {action}")]
pub struct UnsupportedCombination {
    pub entity_type: EntityType,
    pub action: ReleaseAction,
}

impl TryFrom<WireItem> for ReleaseItem {
    type Error = UnsupportedCombination;

    fn try_from(wire: WireItem) -> Result<Self, Self::Error> {
        let item = match (wire.entity_type, wire.action) {
            (EntityType::Job, ReleaseAction::CreateOrUpdate) => ReleaseItem::JobCreateOrUpdate {
                name: wire.name,
                target_groups: wire.target_group_names,
                target_context: none_if_empty(wire.target_context_name),
                job_context: none_if_empty(wire.job_context_name),
            },
            (EntityType::Job, ReleaseAction::UpdateJobInfo) => ReleaseItem::JobUpdateInfo {
                name: wire.name,
                target_groups: wire.target_group_names,
                target_context: none_if_empty(wire.target_context_name),
                job_context: none_if_empty(wire.job_context_name),
            },
            (EntityType::Job, ReleaseAction::Move) => ReleaseItem::JobMove {
                name: wire.name,
                source_groups: wire.source_group_names,
                target_groups: wire.target_group_names,
            },
            (EntityType::Job, ReleaseAction::Delete) => ReleaseItem::JobDelete {
                name: wire.name,
                target_groups: wire.target_group_names,
            },
            (EntityType::JobGroup, ReleaseAction::CreateOrUpdate) => {
                ReleaseItem::GroupCreateOrUpdate {
                    name: wire.name,
                    parent_groups: wire.target_group_names,
                    group_only: wire.operate_job_group_only,
                }
            }
            (EntityType::JobGroup, ReleaseAction::Move) => ReleaseItem::GroupMove {
                name: wire.name,
                target_groups: wire.target_group_names,
                group_only: wire.operate_job_group_only,
            },
            (EntityType::JobGroup, ReleaseAction::Delete) => {
                ReleaseItem::GroupDelete { name: wire.name }
            }
            (EntityType::Context, ReleaseAction::CreateOrUpdate) => {
                ReleaseItem::ContextCreateOrUpdate { name: wire.name }
            }
            (EntityType::ConfigGroup, ReleaseAction::CreateOrUpdate) => {
                ReleaseItem::ConfigGroupCreateOrUpdate {
                    name: wire.name,
                    category: wire.category.unwrap_or_default(),
                }
            }
            (EntityType::Batch, ReleaseAction::CreateOrUpdate) => {
                ReleaseItem::BatchCreateOrUpdate { name: wire.name }
            }
            (entity_type, action) => {
                return Err(UnsupportedCombination {
                    entity_type,
                    action,
                })
            }
        };
        Ok(item)
    }
}

/// Serialize a slice of items into the backend payload shape.
pub fn to_wire(items: &[ReleaseItem]) -> Vec<WireItem> {
    items.iter().map(WireItem::from).collect()
}
