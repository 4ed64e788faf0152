//! Item identity for de-duplication.
//!
//! Two items denote the same staged change when they share entity type, name,
//! and action family. `CREATE_OR_UPDATE` and `UPDATE_JOB_INFO` fall into one
//! family: a job cannot hold two independent create/update entries.

use crate::domain::item::{ReleaseAction, ReleaseItem};

/// Action family used for item identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionFamily {
    /// `CREATE_OR_UPDATE` and `UPDATE_JOB_INFO`.
    Upsert,
    Move,
    Delete,
}

impl ActionFamily {
    pub fn of(action: ReleaseAction) -> Self {
        match action {
            ReleaseAction::CreateOrUpdate | ReleaseAction::UpdateJobInfo => ActionFamily::Upsert,
            ReleaseAction::Move => ActionFamily::Move,
            ReleaseAction::Delete => ActionFamily::Delete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionFamily::Upsert => "UPSERT",
            ActionFamily::Move => "MOVE",
            ActionFamily::Delete => "DELETE",
        }
    }
}

/// Stable identity key for a release item: `TYPE:name:FAMILY`.
///
/// The working set holds at most one item per key.
pub fn identity_key(item: &ReleaseItem) -> String {
    format!(
        "{}:{}:{}",
        item.entity_type().as_str(),
        item.name(),
        ActionFamily::of(item.action()).as_str(),
    )
}
