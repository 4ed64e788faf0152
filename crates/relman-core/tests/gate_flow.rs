//! Gate and submission scenarios: composition screening, environment
//! pinning, clearance checks, and the draft lifecycle around creation.

use std::collections::BTreeMap;

use relman_core::fakes::{FakeJobGroupService, FakePackageService, FakeSensitivityService};
use relman_core::{
    gate, package, AnalysisReport, GateRule, JobContextSummary, JobGroupNode, JobGroupService,
    PackageCreation, PackageName, RecordStatus, ReferenceData, ReleaseEnvironment, ReleaseItem,
    ReleasePackageSubmitter, ReleaseWorkingSet, RollbackOutcome, SensitivityGate,
};
use relman_core::services::{
    ContextRef, JobBundle, PackageDetail, PackageService, ReleaseInstructions,
};
use relman_core::wire::{to_wire, WireItem};
use relman_core::{hierarchy, EntityType, ReleaseAction};
use relman_store::{MemoryPackageStore, PackageStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn job(name: &str) -> ReleaseItem {
    ReleaseItem::JobCreateOrUpdate {
        name: name.to_string(),
        target_groups: vec!["Finance".to_string()],
        target_context: None,
        job_context: None,
    }
}

fn context(name: &str) -> ReleaseItem {
    ReleaseItem::ContextCreateOrUpdate {
        name: name.to_string(),
    }
}

fn draft_with(items: Vec<ReleaseItem>) -> ReleaseWorkingSet {
    let mut set = ReleaseWorkingSet::new(PackageName::draft());
    for item in items {
        set.add(item);
    }
    set
}

async fn record_evaluation(
    gate_state: &mut SensitivityGate,
    service: &FakeSensitivityService,
    env: ReleaseEnvironment,
    set: &ReleaseWorkingSet,
    approved_channel: bool,
) -> RecordStatus {
    let outcome = gate::evaluate(service, env, set, approved_channel)
        .await
        .expect("evaluate");
    gate_state.record(outcome)
}

// ---------------------------------------------------------------------------
// Composition screening
// ---------------------------------------------------------------------------

#[tokio::test]
async fn context_with_job_is_blocked_before_the_backend() {
    let sensitivity = FakeSensitivityService::all_clear();
    let set = draft_with(vec![context("CTX_A"), job("payroll-daily")]);

    let outcome = gate::evaluate(&sensitivity, ReleaseEnvironment::Uat, &set, false)
        .await
        .expect("evaluate");

    assert!(!outcome.allowed());
    assert_eq!(outcome.verdict.violations[0].rule, GateRule::ContextIsolation);
    assert!(outcome.report.is_none());
    assert_eq!(sensitivity.calls(), 0);
}

#[tokio::test]
async fn prod_context_only_blocked_off_the_approved_channel() {
    let sensitivity = FakeSensitivityService::all_clear();
    let set = draft_with(vec![context("CTX_A")]);

    let outcome = gate::evaluate(&sensitivity, ReleaseEnvironment::Prod, &set, false)
        .await
        .expect("evaluate");

    // The backend is clear; the channel rule still blocks.
    assert!(!outcome.allowed());
    assert_eq!(outcome.verdict.violations[0].rule, GateRule::ApprovedChannel);
    let report = outcome.report.expect("report");
    assert!(report.none_sensitive);
    assert_eq!(report.contexts, vec!["CTX_A".to_string()]);
    assert_eq!(sensitivity.calls(), 1);
}

#[tokio::test]
async fn approved_channel_console_can_release_prod_contexts() {
    let console = FakeJobGroupService::new().with_env_name("PREPROD-QUANT");
    let approved_channel = console.app_info().await.expect("app info").env_name == "PREPROD-QUANT";

    let sensitivity = FakeSensitivityService::all_clear();
    let set = draft_with(vec![context("CTX_A")]);

    let outcome = gate::evaluate(
        &sensitivity,
        ReleaseEnvironment::Prod,
        &set,
        approved_channel,
    )
    .await
    .expect("evaluate");

    assert!(outcome.allowed());
}

#[tokio::test]
async fn sensitive_findings_block_and_deny_clearance() {
    let sensitivity = FakeSensitivityService::flagging_execution_system(
        "grid-main",
        "exec://grid-main.prod",
    );
    let set = draft_with(vec![job("payroll-daily")]);

    let mut gate_state = SensitivityGate::new();
    gate_state.select_environment(Some(ReleaseEnvironment::Prod));
    let status = record_evaluation(
        &mut gate_state,
        &sensitivity,
        ReleaseEnvironment::Prod,
        &set,
        false,
    )
    .await;
    assert_eq!(status, RecordStatus::Applied);

    let recorded = gate_state.outcome().expect("outcome");
    assert!(!recorded.allowed());
    assert_eq!(
        recorded.verdict.violations[0].rule,
        GateRule::NoSensitiveFindings
    );
    let report = recorded.report.as_ref().expect("report");
    assert_eq!(
        report.execution_systems["grid-main"],
        "exec://grid-main.prod"
    );

    // A recorded but disallowed outcome grants no clearance.
    let payload = to_wire(set.items());
    assert!(gate_state
        .clearance(ReleaseEnvironment::Prod, &payload)
        .is_none());
}

// ---------------------------------------------------------------------------
// Environment pinning and payload drift
// ---------------------------------------------------------------------------

#[tokio::test]
async fn environment_reselect_drops_inflight_outcome() {
    let sensitivity = FakeSensitivityService::all_clear();
    let set = draft_with(vec![job("payroll-daily")]);

    let mut gate_state = SensitivityGate::new();
    gate_state.select_environment(Some(ReleaseEnvironment::Uat));
    let outcome = gate::evaluate(&sensitivity, ReleaseEnvironment::Uat, &set, false)
        .await
        .expect("evaluate");

    gate_state.select_environment(Some(ReleaseEnvironment::Prod));
    assert_eq!(gate_state.record(outcome), RecordStatus::Stale);
    assert!(gate_state.outcome().is_none());
}

#[tokio::test]
async fn payload_drift_invalidates_clearance_until_reevaluated() {
    let sensitivity = FakeSensitivityService::all_clear();
    let submitter = ReleasePackageSubmitter::new(FakePackageService::succeeding("3.1.0"));
    let store = MemoryPackageStore::new();

    let mut set = draft_with(vec![job("payroll-daily")]);
    let mut gate_state = SensitivityGate::new();
    gate_state.select_environment(Some(ReleaseEnvironment::Uat));
    record_evaluation(
        &mut gate_state,
        &sensitivity,
        ReleaseEnvironment::Uat,
        &set,
        false,
    )
    .await;

    set.add(job("eod-sweep"));
    let refused = submitter
        .submit(&gate_state, ReleaseEnvironment::Uat, &set, None, &store)
        .await;
    assert!(refused.is_err());

    record_evaluation(
        &mut gate_state,
        &sensitivity,
        ReleaseEnvironment::Uat,
        &set,
        false,
    )
    .await;
    let creation = submitter
        .submit(&gate_state, ReleaseEnvironment::Uat, &set, None, &store)
        .await
        .expect("submit after re-evaluation");
    assert!(matches!(creation, PackageCreation::Created(_)));
}

// ---------------------------------------------------------------------------
// Full session flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_session_flow_submits_and_clears_only_the_draft() {
    let console = FakeJobGroupService::new()
        .with_groups(vec![
            JobGroupNode {
                id: 1,
                name: "Finance".to_string(),
                parent_id: None,
            },
            JobGroupNode {
                id: 2,
                name: "FinanceNightly".to_string(),
                parent_id: Some(1),
            },
        ])
        .with_contexts(vec![JobContextSummary {
            id: Some(7),
            name: "CTX_A".to_string(),
        }])
        .with_env_name("PDN");
    let reference = ReferenceData::new(
        console.job_group_list().await.expect("groups"),
        console.job_context_list().await.expect("contexts"),
    );

    // Re-parenting FinanceNightly under Finance is already its position and
    // introduces no cycle.
    let parent = reference.group_by_name("Finance");
    let child = reference.group_by_name("FinanceNightly").expect("child");
    assert!(!hierarchy::would_create_cycle(
        &reference.job_groups,
        parent,
        child
    ));

    let draft_store = MemoryPackageStore::new();
    let session_store = MemoryPackageStore::new();
    session_store
        .put("eod-2024w12", "[]")
        .expect("seed session snapshot");

    let mut set = draft_with(vec![
        ReleaseItem::GroupCreateOrUpdate {
            name: "FinanceNightly".to_string(),
            parent_groups: vec!["Finance".to_string()],
            group_only: false,
        },
        job("payroll-daily"),
    ]);
    set.persist(&draft_store).expect("persist");

    let sensitivity = FakeSensitivityService::all_clear();
    let mut gate_state = SensitivityGate::new();
    gate_state.select_environment(Some(ReleaseEnvironment::Uat));
    let status = record_evaluation(
        &mut gate_state,
        &sensitivity,
        ReleaseEnvironment::Uat,
        &set,
        false,
    )
    .await;
    assert_eq!(status, RecordStatus::Applied);

    let submitter = ReleasePackageSubmitter::new(FakePackageService::succeeding("1.4.2"));
    let creation = submitter
        .submit(
            &gate_state,
            ReleaseEnvironment::Uat,
            &set,
            Some("JIRA-1042"),
            &draft_store,
        )
        .await
        .expect("submit");

    match creation {
        PackageCreation::Created(created) => assert_eq!(created.version, "1.4.2"),
        PackageCreation::Failed { message } => panic!("unexpected failure: {message}"),
    }
    assert!(draft_store.get(PackageName::DRAFT_KEY).expect("get").is_none());
    assert!(session_store.get("eod-2024w12").expect("get").is_some());
}

#[tokio::test]
async fn cloned_package_round_trips_through_the_draft_store() {
    let service = FakePackageService::new();
    service.insert_detail(PackageDetail {
        name: "eod-2024w12".to_string(),
        create_time: Some("2024-03-12 14:30:22".to_string()),
        owner: Some("svc-release".to_string()),
        cr_tool_url: None,
        release_instructions: ReleaseInstructions {
            release_items: vec![WireItem {
                action: ReleaseAction::CreateOrUpdate,
                entity_type: EntityType::Job,
                name: "payroll-daily".to_string(),
                operate_job_group_only: false,
                target_group_names: vec!["Finance".to_string()],
                target_context_name: None,
                source_group_names: Vec::new(),
                job_context_name: None,
                category: None,
            }],
        },
        job_bundles: vec![JobBundle {
            name: "payroll-daily".to_string(),
            context: Some(ContextRef {
                natural_key: "CTX_PAYROLL".to_string(),
            }),
        }],
        config_group_bundles: Vec::new(),
    });

    let draft_store = MemoryPackageStore::new();
    let cloned = package::clone_into_draft(&service, &draft_store, "eod-2024w12")
        .await
        .expect("clone");
    assert!(cloned.is_draft());

    // The enriched context survives the persisted wire shape.
    let restored = ReleaseWorkingSet::restore(PackageName::draft(), &draft_store);
    assert_eq!(restored.items(), cloned.items());
    match &restored.items()[0] {
        ReleaseItem::JobCreateOrUpdate { job_context, .. } => {
            assert_eq!(job_context.as_deref(), Some("CTX_PAYROLL"));
        }
        other => panic!("unexpected item: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle passthroughs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn analysis_and_rollback_surface_backend_reports() {
    let service = FakePackageService::new();
    let mut errors = BTreeMap::new();
    errors.insert(
        "payroll-daily".to_string(),
        vec!["job definition references a missing context".to_string()],
    );
    service.set_analysis(AnalysisReport {
        warnings: BTreeMap::new(),
        errors,
        infos: BTreeMap::new(),
    });
    service.set_rollback(RollbackOutcome {
        succeeded: false,
        log_entries: vec!["package eod-2024w12 not found in registry".to_string()],
    });

    let submitter = ReleasePackageSubmitter::new(service);
    let set = draft_with(vec![job("payroll-daily")]);
    let payload = to_wire(set.items());

    let report = submitter
        .service()
        .analyze(ReleaseEnvironment::Uat, &payload, None)
        .await
        .expect("analyze");
    assert!(!report.is_clean());
    assert_eq!(report.errors["payroll-daily"].len(), 1);

    let rollback = submitter
        .service()
        .rollback("eod-2024w12")
        .await
        .expect("rollback");
    assert!(!rollback.succeeded);
    assert_eq!(rollback.log_entries.len(), 1);
}
