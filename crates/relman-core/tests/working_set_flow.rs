//! Cross-component staging scenarios: merge rules, display ordering,
//! persistence, and recovery through the real file store.

use relman_core::{
    AddOutcome, AddRejection, EntityType, PackageName, ReleaseItem, ReleaseWorkingSet,
};
use relman_store::{JsonFilePackageStore, MemoryPackageStore, PackageStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn job_in(name: &str, group: &str, context: Option<&str>) -> ReleaseItem {
    ReleaseItem::JobCreateOrUpdate {
        name: name.to_string(),
        target_groups: vec![group.to_string()],
        target_context: context.map(str::to_string),
        job_context: None,
    }
}

fn hierarchy(name: &str, parent: &str) -> ReleaseItem {
    ReleaseItem::GroupCreateOrUpdate {
        name: name.to_string(),
        parent_groups: vec![parent.to_string()],
        group_only: false,
    }
}

fn draft() -> ReleaseWorkingSet {
    ReleaseWorkingSet::new(PackageName::draft())
}

// ---------------------------------------------------------------------------
// Merge rules end to end
// ---------------------------------------------------------------------------

#[test]
fn same_job_twice_unions_target_groups() {
    let mut set = draft();
    assert_eq!(set.add(job_in("payroll-daily", "G1", None)), AddOutcome::Added);
    assert_eq!(set.add(job_in("payroll-daily", "G2", None)), AddOutcome::Merged);

    assert_eq!(set.len(), 1);
    match &set.items()[0] {
        ReleaseItem::JobCreateOrUpdate { target_groups, .. } => {
            assert_eq!(target_groups, &vec!["G1".to_string(), "G2".to_string()]);
        }
        other => panic!("unexpected item: {other:?}"),
    }
}

#[test]
fn conflicting_contexts_keep_the_first_staging() {
    let mut set = draft();
    set.add(job_in("payroll-daily", "G1", Some("CTX_A")));
    let outcome = set.add(job_in("payroll-daily", "G2", Some("CTX_B")));

    match outcome {
        AddOutcome::Rejected(AddRejection::ContextMismatch {
            existing, incoming, ..
        }) => {
            assert_eq!(existing.as_deref(), Some("CTX_A"));
            assert_eq!(incoming.as_deref(), Some("CTX_B"));
        }
        other => panic!("expected context mismatch, got {other:?}"),
    }

    assert_eq!(set.len(), 1);
    match &set.items()[0] {
        ReleaseItem::JobCreateOrUpdate {
            target_groups,
            target_context,
            ..
        } => {
            // Untouched: no partial union from the rejected add.
            assert_eq!(target_groups, &vec!["G1".to_string()]);
            assert_eq!(target_context.as_deref(), Some("CTX_A"));
        }
        other => panic!("unexpected item: {other:?}"),
    }
}

#[test]
fn duplicate_singleton_entities_are_rejected() {
    let mut set = draft();
    let context = ReleaseItem::ContextCreateOrUpdate {
        name: "CTX_A".to_string(),
    };
    let batch = ReleaseItem::BatchCreateOrUpdate {
        name: "eod-batch".to_string(),
    };

    assert!(set.add(context.clone()).accepted());
    assert!(set.add(batch.clone()).accepted());
    assert_eq!(
        set.add(context),
        AddOutcome::Rejected(AddRejection::AlreadyInList {
            entity_type: EntityType::Context,
            name: "CTX_A".to_string(),
        })
    );
    assert_eq!(
        set.add(batch),
        AddOutcome::Rejected(AddRejection::AlreadyInList {
            entity_type: EntityType::Batch,
            name: "eod-batch".to_string(),
        })
    );
    assert_eq!(set.len(), 2);
}

#[test]
fn move_and_create_for_one_job_stay_independent() {
    let mut set = draft();
    set.add(job_in("payroll-daily", "G1", None));
    let outcome = set.add(ReleaseItem::JobMove {
        name: "payroll-daily".to_string(),
        source_groups: vec!["OldTree".to_string()],
        target_groups: vec!["NewTree".to_string()],
    });

    assert_eq!(outcome, AddOutcome::Added);
    assert_eq!(set.len(), 2);
}

// ---------------------------------------------------------------------------
// Display order and removal
// ---------------------------------------------------------------------------

#[test]
fn display_order_clusters_types_and_removal_hits_the_shown_row() {
    let mut set = draft();
    set.add(ReleaseItem::BatchCreateOrUpdate {
        name: "eod-batch".to_string(),
    });
    set.add(job_in("payroll-daily", "G1", None));
    set.add(hierarchy("FinanceNightly", "Finance"));

    let order = set.display_order();
    let types: Vec<EntityType> = order.iter().map(|(_, item)| item.entity_type()).collect();
    assert_eq!(
        types,
        vec![EntityType::JobGroup, EntityType::Job, EntityType::Batch]
    );

    // Remove the first displayed row (the hierarchy) via its carried index.
    let internal_index = order[0].0;
    let removed = set.remove_at(internal_index).expect("remove");
    assert_eq!(removed.name(), "FinanceNightly");
    assert_eq!(set.len(), 2);
    assert!(set
        .items()
        .iter()
        .all(|item| item.entity_type() != EntityType::JobGroup));
}

// ---------------------------------------------------------------------------
// Persistence through the stores
// ---------------------------------------------------------------------------

#[test]
fn draft_round_trips_through_the_file_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFilePackageStore::new(dir.path());

    let mut set = draft();
    set.add(job_in("payroll-daily", "G1", Some("CTX_A")));
    set.add(hierarchy("FinanceNightly", "Finance"));
    set.persist(&store).expect("persist");

    let restored = ReleaseWorkingSet::restore(PackageName::draft(), &store);
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.items(), set.items());
}

#[test]
fn corrupt_draft_entry_recovers_to_empty_and_is_cleared() {
    let store = MemoryPackageStore::new();
    store
        .put(PackageName::DRAFT_KEY, "{not valid json")
        .expect("put");

    let restored = ReleaseWorkingSet::restore(PackageName::draft(), &store);
    assert!(restored.is_empty());
    assert!(store.get(PackageName::DRAFT_KEY).expect("get").is_none());
}

#[test]
fn clearing_and_replacing_rebuild_the_set() {
    let mut set = draft();
    set.add(job_in("payroll-daily", "G1", None));
    set.clear();
    assert!(set.is_empty());

    set.replace_all(vec![
        hierarchy("FinanceNightly", "Finance"),
        job_in("eod-sweep", "G2", None),
    ]);
    assert_eq!(set.len(), 2);
}
