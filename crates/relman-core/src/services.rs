//! Backend service boundaries.
//!
//! These traits define the console's three backend touchpoints:
//! - `JobGroupService`: reference data (group tree, context list, app info)
//! - `SensitivityService`: pre-submission sensitivity classification
//! - `PackageService`: package creation, detail, listing, analysis, rollback
//!
//! All traits are async and transport-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module; the HTTP implementations live in the
//! client crate.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::category::ConfigCategory;
use crate::domain::environment::ReleaseEnvironment;
use crate::domain::error::Result;
use crate::domain::reference::{JobContextSummary, JobGroupNode};
use crate::wire::WireItem;

// ---------------------------------------------------------------------------
// JobGroupService — reference data
// ---------------------------------------------------------------------------

/// Console instance metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    /// Deployment channel tag of the console instance itself.
    #[serde(default)]
    pub env_name: String,
}

/// Point-in-time reference data used by the staging widgets.
#[async_trait]
pub trait JobGroupService: Send + Sync {
    /// The full job-group tree. Treated as a snapshot; concurrent edits show
    /// up only on the next fetch.
    async fn job_group_list(&self) -> Result<Vec<JobGroupNode>>;

    /// All known job contexts.
    async fn job_context_list(&self) -> Result<Vec<JobContextSummary>>;

    /// Metadata about the console instance serving the session.
    async fn app_info(&self) -> Result<AppInfo>;
}

// ---------------------------------------------------------------------------
// SensitivityService — classification
// ---------------------------------------------------------------------------

/// What the backend found sensitive for an environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitivityFindings {
    /// Sensitive configuration groups: name to flagged parameter/value pairs.
    #[serde(rename = "ConfigGroup", default)]
    pub config_groups: BTreeMap<String, BTreeMap<String, String>>,
    /// Sensitive execution systems: name to URI.
    #[serde(rename = "ExecutionSystem", default)]
    pub execution_systems: BTreeMap<String, String>,
    /// True when nothing in the payload is sensitive for the environment.
    #[serde(rename = "NoneSensitive", default)]
    pub none_sensitive: bool,
    /// Cluster label the backend answered for.
    #[serde(default)]
    pub env: String,
}

/// Pre-submission sensitivity classification.
#[async_trait]
pub trait SensitivityService: Send + Sync {
    /// Classify the payload for the given environment.
    async fn check_release_items(
        &self,
        env: ReleaseEnvironment,
        items: &[WireItem],
    ) -> Result<SensitivityFindings>;
}

// ---------------------------------------------------------------------------
// PackageService — creation and lifecycle
// ---------------------------------------------------------------------------

/// Payload for package creation and analysis calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageInput {
    pub release_items: Vec<WireItem>,
    pub env: ReleaseEnvironment,
}

/// Backend record of a successfully created package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedPackage {
    /// Artifact coordinate of the published package.
    #[serde(rename = "maven2.version")]
    pub artifact_version: String,
    pub version: String,
    #[serde(rename = "jiraKey", default)]
    pub jira_key: Option<String>,
    #[serde(rename = "CRToolUrl", default)]
    pub cr_tool_url: Option<String>,
}

/// Outcome of a package creation call. A rejected creation is a normal
/// answer, not a transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageCreation {
    Created(CreatedPackage),
    Failed { message: String },
}

/// Stored contents of a previously created package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetail {
    pub name: String,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(rename = "userName", default)]
    pub owner: Option<String>,
    #[serde(rename = "CRToolUrl", default)]
    pub cr_tool_url: Option<String>,
    #[serde(default)]
    pub release_instructions: ReleaseInstructions,
    #[serde(default)]
    pub job_bundles: Vec<JobBundle>,
    #[serde(default)]
    pub config_group_bundles: Vec<ConfigGroupBundle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInstructions {
    #[serde(default)]
    pub release_items: Vec<WireItem>,
}

/// Job snapshot bundled into a package at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobBundle {
    pub name: String,
    #[serde(default)]
    pub context: Option<ContextRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextRef {
    pub natural_key: String,
}

/// Configuration-group snapshot bundled into a package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigGroupBundle {
    pub name: String,
    #[serde(default)]
    pub category: Option<ConfigCategory>,
}

/// One row of the packages-by-date listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Per-entity findings from a dry-run analysis, keyed by entity name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisReport {
    #[serde(default)]
    pub warnings: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub infos: BTreeMap<String, Vec<String>>,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

/// Result of rolling a package back. The backend reports its log either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackOutcome {
    pub succeeded: bool,
    pub log_entries: Vec<String>,
}

/// Package lifecycle operations.
#[async_trait]
pub trait PackageService: Send + Sync {
    /// Create a release package, optionally linked to a change ticket.
    async fn create_package(
        &self,
        jira_key: Option<&str>,
        input: &CreatePackageInput,
    ) -> Result<PackageCreation>;

    /// Fetch a created package's stored contents by name.
    async fn package_detail(&self, name: &str) -> Result<PackageDetail>;

    /// List packages created on the given date.
    async fn list_packages(&self, date: NaiveDate) -> Result<Vec<PackageSummary>>;

    /// Dry-run the payload against an environment. `package` scopes the run
    /// to an existing package when re-analyzing one.
    async fn analyze(
        &self,
        env: ReleaseEnvironment,
        items: &[WireItem],
        package: Option<&str>,
    ) -> Result<AnalysisReport>;

    /// Roll a released package back.
    async fn rollback(&self, name: &str) -> Result<RollbackOutcome>;
}
