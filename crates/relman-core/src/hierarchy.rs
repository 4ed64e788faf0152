//! Cycle detection for job-group re-parenting.
//!
//! The hierarchy is a forest described by `parent_id` links. Before a
//! re-parent is staged, the caller asks whether attaching `child` under
//! `proposed_parent` would make `child` an ancestor of itself. The check runs
//! against a point-in-time snapshot of the tree and must stay total on stale
//! snapshots: dangling parent links and pre-existing cycles terminate the
//! walk instead of looping.

use std::collections::HashSet;

use crate::domain::reference::JobGroupNode;

/// True when attaching `child` under `proposed_parent` would close a loop.
///
/// A `None` parent attaches at the root and is never a cycle. The walk starts
/// at the proposed parent itself, so parenting a node under itself is
/// reported as a cycle.
pub fn would_create_cycle(
    tree: &[JobGroupNode],
    proposed_parent: Option<&JobGroupNode>,
    child: &JobGroupNode,
) -> bool {
    let Some(parent) = proposed_parent else {
        return false;
    };

    let mut visited = HashSet::new();
    let mut current = Some(parent);
    while let Some(node) = current {
        if node.id == child.id {
            return true;
        }
        if !visited.insert(node.id) {
            // The snapshot already contains a loop; the child was not on it.
            return false;
        }
        current = node
            .parent_id
            .and_then(|parent_id| tree.iter().find(|candidate| candidate.id == parent_id));
    }
    false
}
