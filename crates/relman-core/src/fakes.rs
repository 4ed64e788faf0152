//! In-memory fakes for the backend service traits (testing only)
//!
//! Provides `FakeJobGroupService`, `FakeSensitivityService`, and
//! `FakePackageService` that satisfy the trait contracts without any
//! transport. State is set up through constructors and setters; calls are
//! recorded so tests can assert on what reached the backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::environment::ReleaseEnvironment;
use crate::domain::error::{ReleaseError, Result};
use crate::domain::reference::{JobContextSummary, JobGroupNode};
use crate::services::{
    AnalysisReport, AppInfo, CreatePackageInput, CreatedPackage, JobGroupService, PackageCreation,
    PackageDetail, PackageService, PackageSummary, RollbackOutcome, SensitivityFindings,
    SensitivityService,
};
use crate::wire::WireItem;

// ---------------------------------------------------------------------------
// FakeJobGroupService
// ---------------------------------------------------------------------------

/// Reference-data service answering from fixed lists.
#[derive(Debug, Default)]
pub struct FakeJobGroupService {
    groups: Vec<JobGroupNode>,
    contexts: Vec<JobContextSummary>,
    env_name: String,
}

impl FakeJobGroupService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(mut self, groups: Vec<JobGroupNode>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_contexts(mut self, contexts: Vec<JobContextSummary>) -> Self {
        self.contexts = contexts;
        self
    }

    pub fn with_env_name(mut self, env_name: &str) -> Self {
        self.env_name = env_name.to_string();
        self
    }
}

#[async_trait]
impl JobGroupService for FakeJobGroupService {
    async fn job_group_list(&self) -> Result<Vec<JobGroupNode>> {
        Ok(self.groups.clone())
    }

    async fn job_context_list(&self) -> Result<Vec<JobContextSummary>> {
        Ok(self.contexts.clone())
    }

    async fn app_info(&self) -> Result<AppInfo> {
        Ok(AppInfo {
            env_name: self.env_name.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// FakeSensitivityService
// ---------------------------------------------------------------------------

/// Sensitivity classifier answering with a fixed set of findings. The `env`
/// label echoes whatever environment was asked for; calls are counted so
/// tests can assert the backend was (or was not) consulted.
#[derive(Debug)]
pub struct FakeSensitivityService {
    findings: SensitivityFindings,
    calls: Mutex<usize>,
}

impl FakeSensitivityService {
    /// Nothing sensitive, whatever the payload.
    pub fn all_clear() -> Self {
        Self {
            findings: SensitivityFindings {
                none_sensitive: true,
                ..SensitivityFindings::default()
            },
            calls: Mutex::new(0),
        }
    }

    /// Flags one configuration group with a single sensitive parameter.
    pub fn flagging_config_group(name: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("endpoint".to_string(), format!("prod://{name}"));
        let mut config_groups = BTreeMap::new();
        config_groups.insert(name.to_string(), params);
        Self {
            findings: SensitivityFindings {
                config_groups,
                none_sensitive: false,
                ..SensitivityFindings::default()
            },
            calls: Mutex::new(0),
        }
    }

    /// Flags one execution system by URI.
    pub fn flagging_execution_system(name: &str, uri: &str) -> Self {
        let mut execution_systems = BTreeMap::new();
        execution_systems.insert(name.to_string(), uri.to_string());
        Self {
            findings: SensitivityFindings {
                execution_systems,
                none_sensitive: false,
                ..SensitivityFindings::default()
            },
            calls: Mutex::new(0),
        }
    }

    /// How many times the classifier was consulted.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SensitivityService for FakeSensitivityService {
    async fn check_release_items(
        &self,
        env: ReleaseEnvironment,
        _items: &[WireItem],
    ) -> Result<SensitivityFindings> {
        *self.calls.lock().unwrap() += 1;
        let mut findings = self.findings.clone();
        findings.env = env.as_str().to_string();
        Ok(findings)
    }
}

// ---------------------------------------------------------------------------
// FakePackageService
// ---------------------------------------------------------------------------

/// Package lifecycle service backed by in-memory maps.
#[derive(Debug, Default)]
pub struct FakePackageService {
    create_response: Mutex<Option<PackageCreation>>,
    create_calls: Mutex<Vec<(Option<String>, CreatePackageInput)>>,
    details: Mutex<HashMap<String, PackageDetail>>,
    summaries: Mutex<Vec<PackageSummary>>,
    analysis: Mutex<AnalysisReport>,
    rollback_outcome: Mutex<Option<RollbackOutcome>>,
}

impl FakePackageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every creation succeeds with the given version.
    pub fn succeeding(version: &str) -> Self {
        let service = Self::default();
        *service.create_response.lock().unwrap() =
            Some(PackageCreation::Created(CreatedPackage {
                artifact_version: version.to_string(),
                version: version.to_string(),
                jira_key: None,
                cr_tool_url: None,
            }));
        service
    }

    /// Every creation is rejected with the given message.
    pub fn failing(message: &str) -> Self {
        let service = Self::default();
        *service.create_response.lock().unwrap() = Some(PackageCreation::Failed {
            message: message.to_string(),
        });
        service
    }

    pub fn insert_detail(&self, detail: PackageDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.name.clone(), detail);
    }

    pub fn set_packages(&self, summaries: Vec<PackageSummary>) {
        *self.summaries.lock().unwrap() = summaries;
    }

    pub fn set_analysis(&self, report: AnalysisReport) {
        *self.analysis.lock().unwrap() = report;
    }

    pub fn set_rollback(&self, outcome: RollbackOutcome) {
        *self.rollback_outcome.lock().unwrap() = Some(outcome);
    }

    /// Recorded `(jira_key, input)` pairs, in call order.
    pub fn create_calls(&self) -> Vec<(Option<String>, CreatePackageInput)> {
        self.create_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageService for FakePackageService {
    async fn create_package(
        &self,
        jira_key: Option<&str>,
        input: &CreatePackageInput,
    ) -> Result<PackageCreation> {
        self.create_calls
            .lock()
            .unwrap()
            .push((jira_key.map(str::to_string), input.clone()));
        let response = self.create_response.lock().unwrap().clone();
        Ok(response.unwrap_or_else(|| {
            PackageCreation::Created(CreatedPackage {
                artifact_version: "0.0.0".to_string(),
                version: "0.0.0".to_string(),
                jira_key: jira_key.map(str::to_string),
                cr_tool_url: None,
            })
        }))
    }

    async fn package_detail(&self, name: &str) -> Result<PackageDetail> {
        self.details
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ReleaseError::Backend(format!("package {name} not found")))
    }

    async fn list_packages(&self, _date: NaiveDate) -> Result<Vec<PackageSummary>> {
        Ok(self.summaries.lock().unwrap().clone())
    }

    async fn analyze(
        &self,
        _env: ReleaseEnvironment,
        _items: &[WireItem],
        _package: Option<&str>,
    ) -> Result<AnalysisReport> {
        Ok(self.analysis.lock().unwrap().clone())
    }

    async fn rollback(&self, name: &str) -> Result<RollbackOutcome> {
        self.rollback_outcome
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ReleaseError::Backend(format!("package {name} not found")))
    }
}
