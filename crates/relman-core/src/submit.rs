//! Release package submission.

use relman_store::PackageStore;

use crate::domain::environment::ReleaseEnvironment;
use crate::domain::error::{ReleaseError, Result};
use crate::gate::SensitivityGate;
use crate::obs;
use crate::services::{CreatePackageInput, PackageCreation, PackageService};
use crate::wire;
use crate::working_set::ReleaseWorkingSet;

/// Thin submission layer over a package service backend.
pub struct ReleasePackageSubmitter<P> {
    service: P,
}

impl<P> ReleasePackageSubmitter<P>
where
    P: PackageService,
{
    pub fn new(service: P) -> Self {
        Self { service }
    }

    /// The underlying package service, for the lifecycle calls that need no
    /// gate (detail, listing, analysis, rollback).
    pub fn service(&self) -> &P {
        &self.service
    }

    /// Submit the working set as a release package.
    ///
    /// Requires a gate clearance for exactly this environment and payload;
    /// anything the gate has not cleared is refused before the backend is
    /// touched. On a created package the draft's durable entry is removed
    /// (named packages' session snapshots are never touched); on a rejected
    /// creation or transport error the working set and stores are left as
    /// they were.
    pub async fn submit(
        &self,
        gate: &SensitivityGate,
        env: ReleaseEnvironment,
        set: &ReleaseWorkingSet,
        jira_key: Option<&str>,
        draft_store: &dyn PackageStore,
    ) -> Result<PackageCreation> {
        if set.is_empty() {
            return Err(ReleaseError::EmptyWorkingSet);
        }

        let payload = wire::to_wire(set.items());
        if gate.clearance(env, &payload).is_none() {
            return Err(ReleaseError::GateNotPassed { env });
        }

        let input = CreatePackageInput {
            release_items: payload,
            env,
        };
        let creation = self.service.create_package(jira_key, &input).await?;

        match &creation {
            PackageCreation::Created(created) => {
                obs::emit_package_created(set.package_name().as_str(), &created.version);
                if set.is_draft() {
                    if let Err(err) = draft_store.remove(set.package_name().as_str()) {
                        obs::emit_draft_clear_failed(set.package_name().as_str(), &err);
                    }
                }
            }
            PackageCreation::Failed { message } => {
                obs::emit_package_create_failed(set.package_name().as_str(), message);
            }
        }

        Ok(creation)
    }
}
