//! HTTP implementations of the backend service traits.
//!
//! `ConsoleClient` speaks the console's `/api/v2` REST surface. The release
//! endpoints answer inside a `{ status, message?, data? }` envelope; the
//! reference-data endpoints, the sensitivity check, and the analysis answer
//! with bare JSON. Non-2xx responses carry their detail as
//! `{ message }` when the server has one.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use relman_core::{
    AnalysisReport, AppInfo, CreatePackageInput, CreatedPackage, JobContextSummary, JobGroupNode,
    JobGroupService, PackageCreation, PackageDetail, PackageService, PackageSummary,
    ReleaseEnvironment, ReleaseError, Result, RollbackOutcome, SensitivityFindings,
    SensitivityService, WireItem,
};

use crate::config::ConsoleConfig;

/// Response envelope used by the release endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

impl Envelope {
    fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }

    /// Extract one named field out of `data`.
    fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .data
            .get(key)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value)
            .map_err(|err| ReleaseError::Backend(format!("malformed `{key}` in response: {err}")))
    }

    fn failure_message(self) -> String {
        self.message
            .unwrap_or_else(|| "An error occurred.".to_string())
    }
}

/// Error detail shape servers use on non-2xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Payload for the check and analysis endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseItemsBody<'a> {
    release_items: &'a [WireItem],
}

fn transport(err: reqwest::Error) -> ReleaseError {
    ReleaseError::Backend(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| "An error occurred.".to_string());
        return Err(ReleaseError::Backend(message));
    }
    response.json::<T>().await.map_err(transport)
}

fn create_package_path(jira_key: Option<&str>) -> String {
    // The backend expects a literal `null` segment when no ticket is linked.
    format!(
        "/api/v2/releases/create-package/{}",
        jira_key.unwrap_or("null")
    )
}

fn analyze_path(env: ReleaseEnvironment, package: Option<&str>) -> String {
    match package {
        Some(package) => format!(
            "/api/v2/releases/verify-release-items/{}/{}",
            env.as_str(),
            package
        ),
        None => format!("/api/v2/releases/verify-release-items/{}", env.as_str()),
    }
}

/// Console client implementing the core's backend service traits.
pub struct ConsoleClient {
    config: ConsoleConfig,
    http_client: reqwest::Client,
}

impl ConsoleClient {
    /// Create a new console client
    pub fn new(config: ConsoleConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("relman/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        ConsoleClient {
            config,
            http_client,
        }
    }

    /// Create a client from environment variables
    pub fn from_env() -> Self {
        Self::new(ConsoleConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(method = "GET", path = %path);
        let response = self
            .http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(method = "POST", path = %path);
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(method = "POST", path = %path);
        let response = self
            .http_client
            .post(self.url(path))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}

#[async_trait]
impl JobGroupService for ConsoleClient {
    async fn job_group_list(&self) -> Result<Vec<JobGroupNode>> {
        self.get_json("/api/v2/job-groups/list").await
    }

    async fn job_context_list(&self) -> Result<Vec<JobContextSummary>> {
        self.get_json("/api/v2/job-context/list").await
    }

    async fn app_info(&self) -> Result<AppInfo> {
        self.get_json("/api/v2/app-info").await
    }
}

#[async_trait]
impl SensitivityService for ConsoleClient {
    async fn check_release_items(
        &self,
        env: ReleaseEnvironment,
        items: &[WireItem],
    ) -> Result<SensitivityFindings> {
        let path = format!(
            "/api/v2/releases/verify-release-items-before-create/{}",
            env.as_str()
        );
        self.post_json(
            &path,
            &ReleaseItemsBody {
                release_items: items,
            },
        )
        .await
    }
}

#[async_trait]
impl PackageService for ConsoleClient {
    async fn create_package(
        &self,
        jira_key: Option<&str>,
        input: &CreatePackageInput,
    ) -> Result<PackageCreation> {
        let envelope: Envelope = self
            .post_json(&create_package_path(jira_key), input)
            .await?;
        if envelope.is_success() {
            let created: CreatedPackage = envelope.field("result")?;
            Ok(PackageCreation::Created(created))
        } else {
            Ok(PackageCreation::Failed {
                message: envelope.failure_message(),
            })
        }
    }

    async fn package_detail(&self, name: &str) -> Result<PackageDetail> {
        let envelope: Envelope = self
            .get_json(&format!("/api/v2/releases/package-detail/{name}"))
            .await?;
        if envelope.is_success() {
            envelope.field("packageDetail")
        } else {
            Err(ReleaseError::Backend(envelope.failure_message()))
        }
    }

    async fn list_packages(&self, date: NaiveDate) -> Result<Vec<PackageSummary>> {
        let path = format!(
            "/api/v2/releases/list-package/{}",
            date.format("%Y%m%d")
        );
        let envelope: Envelope = self.get_json(&path).await?;
        if envelope.is_success() {
            envelope.field("packageList")
        } else {
            Err(ReleaseError::Backend(envelope.failure_message()))
        }
    }

    async fn analyze(
        &self,
        env: ReleaseEnvironment,
        items: &[WireItem],
        package: Option<&str>,
    ) -> Result<AnalysisReport> {
        self.post_json(
            &analyze_path(env, package),
            &ReleaseItemsBody {
                release_items: items,
            },
        )
        .await
    }

    async fn rollback(&self, name: &str) -> Result<RollbackOutcome> {
        let envelope: Envelope = self
            .post_empty(&format!("/api/v2/releases/rollback/{name}"))
            .await?;
        let succeeded = envelope.is_success();
        // The rollback log comes back on failure answers too.
        let log_entries: Vec<String> = envelope.field("logEntryList").unwrap_or_default();
        Ok(RollbackOutcome {
            succeeded,
            log_entries,
        })
    }
}
