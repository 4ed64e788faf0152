//! Reference data snapshots.
//!
//! The hierarchy tree and context list are fetched once when a release
//! workflow starts and threaded through calls by reference. Validation
//! results are only as fresh as the snapshot; callers refetch when they
//! need a newer view.

use serde::{Deserialize, Serialize};

/// One node of the job-group hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobGroupNode {
    pub id: i64,
    pub name: String,
    /// Parent node id; `None` for nodes attached at the root.
    pub parent_id: Option<i64>,
}

/// Summary of a job context definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobContextSummary {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// Snapshot of the backend reference data a release session works against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub job_groups: Vec<JobGroupNode>,
    pub job_contexts: Vec<JobContextSummary>,
}

impl ReferenceData {
    pub fn new(job_groups: Vec<JobGroupNode>, job_contexts: Vec<JobContextSummary>) -> Self {
        Self {
            job_groups,
            job_contexts,
        }
    }

    /// Look up a hierarchy node by name.
    pub fn group_by_name(&self, name: &str) -> Option<&JobGroupNode> {
        self.job_groups.iter().find(|group| group.name == name)
    }

    /// Case-insensitive substring filter over group names, for interactive
    /// selection.
    pub fn suggest_groups(&self, fragment: &str) -> Vec<&JobGroupNode> {
        let needle = fragment.to_lowercase();
        self.job_groups
            .iter()
            .filter(|group| group.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Case-insensitive substring filter over context names.
    pub fn suggest_contexts(&self, fragment: &str) -> Vec<&JobContextSummary> {
        let needle = fragment.to_lowercase();
        self.job_contexts
            .iter()
            .filter(|context| context.name.to_lowercase().contains(&needle))
            .collect()
    }
}
