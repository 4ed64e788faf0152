//! Release package builder core
//!
//! Assembles release packages for a job-scheduler console: staging items into
//! a working set with identity-based merge rules, validating hierarchy
//! re-parenting, gating submission on an environment sensitivity check, and
//! handing the cleared payload to the backend.

pub mod domain;
pub mod fakes;
pub mod gate;
pub mod hierarchy;
pub mod obs;
pub mod package;
pub mod services;
pub mod submit;
pub mod telemetry;
pub mod wire;
pub mod working_set;

pub use domain::{
    identity_key, ActionFamily, CategoryClass, ConfigCategory, EntityType, JobContextSummary,
    JobGroupNode, ReferenceData, ReleaseAction, ReleaseEnvironment, ReleaseError, ReleaseItem,
    Result,
};

pub use gate::{
    classify, evaluate, screen, GateOutcome, GateRule, GateVerdict, GateViolation, RecordStatus,
    ReleaseShape, SensitivityGate, SensitivityReport,
};
pub use hierarchy::would_create_cycle;
pub use package::{clone_into_draft, hydrate_items, is_full_scheduler_package, open_package};
pub use services::{
    AnalysisReport, AppInfo, ConfigGroupBundle, ContextRef, CreatePackageInput, CreatedPackage,
    JobBundle, JobGroupService, PackageCreation, PackageDetail, PackageService, PackageSummary,
    ReleaseInstructions, RollbackOutcome, SensitivityFindings, SensitivityService,
};
pub use submit::ReleasePackageSubmitter;
pub use wire::{to_wire, WireItem};
pub use working_set::{
    AddOutcome, AddRejection, PackageName, ReleaseWorkingSet,
};

pub use obs::PackageSpan;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
