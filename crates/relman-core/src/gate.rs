//! Environment sensitivity gate.
//!
//! Evaluates a working set against a target environment to produce a
//! [`GateVerdict`] — the allow/block decision that stands between staging and
//! package creation. The local rules (context isolation, approved channel)
//! run before the backend is consulted; the backend's classification supplies
//! the sensitive-entity findings. The stateful [`SensitivityGate`] pins each
//! outcome to the environment it was issued for so an answer that arrives
//! after the user re-selects cannot be mistaken for current.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::environment::ReleaseEnvironment;
use crate::domain::error::{ReleaseError, Result};
use crate::domain::item::{ReleaseAction, ReleaseItem};
use crate::obs;
use crate::services::SensitivityService;
use crate::wire::{self, WireItem};
use crate::working_set::ReleaseWorkingSet;

// ---------------------------------------------------------------------------
// Release shape (input to the local rules)
// ---------------------------------------------------------------------------

/// How context-like content mixes with the rest of the working set.
///
/// Context-like items are context releases and technical configuration
/// groups. Everything else with a create/update action counts against them;
/// moves, deletes and info updates count for neither side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseShape {
    /// No context-like items staged.
    NoContextChanges,
    /// Only context-like items staged (plus any moves/deletes).
    ContextOnly { names: Vec<String> },
    /// Context-like items staged alongside other create/update items.
    Mixed { names: Vec<String> },
}

impl ReleaseShape {
    /// Names of the staged context-like entities.
    pub fn context_names(&self) -> &[String] {
        match self {
            ReleaseShape::NoContextChanges => &[],
            ReleaseShape::ContextOnly { names } | ReleaseShape::Mixed { names } => names,
        }
    }
}

/// Classify the working set's composition.
pub fn classify(set: &ReleaseWorkingSet) -> ReleaseShape {
    let mut names = Vec::new();
    let mut other_creates = 0usize;

    for item in set.items() {
        match item {
            ReleaseItem::ContextCreateOrUpdate { name } => names.push(name.clone()),
            ReleaseItem::ConfigGroupCreateOrUpdate { name, category }
                if category.is_technical() =>
            {
                names.push(name.clone())
            }
            _ if item.action() == ReleaseAction::CreateOrUpdate => other_creates += 1,
            _ => {}
        }
    }

    if names.is_empty() {
        ReleaseShape::NoContextChanges
    } else if other_creates == 0 {
        ReleaseShape::ContextOnly { names }
    } else {
        ReleaseShape::Mixed { names }
    }
}

// ---------------------------------------------------------------------------
// Gate rules
// ---------------------------------------------------------------------------

/// A single gate rule that can block submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateRule {
    /// Context and technical configuration changes go out alone.
    ContextIsolation,
    /// Production context-only releases require the approved channel.
    ApprovedChannel,
    /// The backend must report nothing sensitive for the environment.
    NoSensitiveFindings,
}

/// A single rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateViolation {
    /// Which rule was violated.
    pub rule: GateRule,
    /// Human-readable explanation naming the offending entities.
    pub reason: String,
}

/// The gate's allow/block decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateVerdict {
    /// Violations found (empty when allowed).
    pub violations: Vec<GateViolation>,
}

impl GateVerdict {
    fn from_violations(violations: Vec<GateViolation>) -> Self {
        Self { violations }
    }

    /// Whether submission is allowed (no violations).
    pub fn allowed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run the local rules. No backend involved.
pub fn screen(
    env: ReleaseEnvironment,
    shape: &ReleaseShape,
    approved_channel: bool,
) -> Vec<GateViolation> {
    let mut violations = Vec::new();

    if let ReleaseShape::Mixed { names } = shape {
        violations.push(GateViolation {
            rule: GateRule::ContextIsolation,
            reason: format!(
                "context changes ({}) cannot be released together with other change types",
                names.join(", "),
            ),
        });
    }

    if env == ReleaseEnvironment::Prod
        && matches!(shape, ReleaseShape::ContextOnly { .. })
        && !approved_channel
    {
        violations.push(GateViolation {
            rule: GateRule::ApprovedChannel,
            reason: "production context releases must be created from the approved channel console"
                .to_string(),
        });
    }

    violations
}

// ---------------------------------------------------------------------------
// Sensitivity report and outcome
// ---------------------------------------------------------------------------

/// Findings shown to the user before submission: the backend's classification
/// merged with the locally derived context list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitivityReport {
    /// Cluster label the backend answered for.
    pub env: String,
    /// Sensitive configuration groups: name to flagged parameter/value pairs.
    pub config_groups: BTreeMap<String, BTreeMap<String, String>>,
    /// Sensitive execution systems: name to URI.
    pub execution_systems: BTreeMap<String, String>,
    /// Context-like entities staged in the working set.
    pub contexts: Vec<String>,
    /// Backend's overall all-clear flag.
    pub none_sensitive: bool,
}

/// One full gate evaluation, pinned to the environment and payload it was
/// issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub env: ReleaseEnvironment,
    /// Exact wire payload that was evaluated.
    pub payload: Vec<WireItem>,
    /// Absent when the local rules blocked before the backend call.
    pub report: Option<SensitivityReport>,
    pub verdict: GateVerdict,
}

impl GateOutcome {
    pub fn allowed(&self) -> bool {
        self.verdict.allowed()
    }
}

/// Evaluate the working set for an environment.
///
/// The composition rule short-circuits before the backend call: a mixed
/// release is blocked with no classification to show. Everything else goes to
/// the backend, and its findings are folded into the verdict.
pub async fn evaluate(
    service: &dyn SensitivityService,
    env: ReleaseEnvironment,
    set: &ReleaseWorkingSet,
    approved_channel: bool,
) -> Result<GateOutcome> {
    if set.is_empty() {
        return Err(ReleaseError::EmptyWorkingSet);
    }

    let payload = wire::to_wire(set.items());
    let shape = classify(set);
    let mut violations = screen(env, &shape, approved_channel);

    if matches!(shape, ReleaseShape::Mixed { .. }) {
        let verdict = GateVerdict::from_violations(violations);
        obs::emit_gate_evaluated(env.as_str(), false, verdict.violations.len());
        return Ok(GateOutcome {
            env,
            payload,
            report: None,
            verdict,
        });
    }

    let findings = service.check_release_items(env, &payload).await?;
    if !findings.none_sensitive {
        violations.push(GateViolation {
            rule: GateRule::NoSensitiveFindings,
            reason: format!(
                "backend flagged {} config group(s) and {} execution system(s) as sensitive",
                findings.config_groups.len(),
                findings.execution_systems.len(),
            ),
        });
    }

    let report = SensitivityReport {
        env: findings.env,
        config_groups: findings.config_groups,
        execution_systems: findings.execution_systems,
        contexts: shape.context_names().to_vec(),
        none_sensitive: findings.none_sensitive,
    };
    let verdict = GateVerdict::from_violations(violations);
    obs::emit_gate_evaluated(env.as_str(), verdict.allowed(), verdict.violations.len());

    Ok(GateOutcome {
        env,
        payload,
        report: Some(report),
        verdict,
    })
}

// ---------------------------------------------------------------------------
// Stateful gate (one per session)
// ---------------------------------------------------------------------------

/// Whether a recorded outcome was applied or discarded as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Applied,
    /// The outcome's environment no longer matches the selection.
    Stale,
}

/// Session state tying gate outcomes to the currently selected environment.
///
/// Selecting an environment clears any recorded outcome. An outcome is only
/// recorded when its environment tag matches the current selection, so an
/// evaluation that returns after the user re-selects is dropped.
#[derive(Debug, Default)]
pub struct SensitivityGate {
    selected: Option<ReleaseEnvironment>,
    outcome: Option<GateOutcome>,
}

impl SensitivityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the environment selection, invalidating any recorded outcome.
    pub fn select_environment(&mut self, env: Option<ReleaseEnvironment>) {
        self.selected = env;
        self.outcome = None;
    }

    pub fn selected_environment(&self) -> Option<ReleaseEnvironment> {
        self.selected
    }

    /// Record an evaluation outcome. Discarded when its environment does not
    /// match the current selection.
    pub fn record(&mut self, outcome: GateOutcome) -> RecordStatus {
        if self.selected != Some(outcome.env) {
            obs::emit_stale_outcome_discarded(
                outcome.env.as_str(),
                self.selected.map(|env| env.as_str()).unwrap_or("-"),
            );
            return RecordStatus::Stale;
        }
        self.outcome = Some(outcome);
        RecordStatus::Applied
    }

    /// The currently recorded outcome, if any.
    pub fn outcome(&self) -> Option<&GateOutcome> {
        self.outcome.as_ref()
    }

    /// The recorded outcome, but only if it allows submission of exactly this
    /// environment and payload. Submission preconditions hang off this.
    pub fn clearance(&self, env: ReleaseEnvironment, payload: &[WireItem]) -> Option<&GateOutcome> {
        self.outcome
            .as_ref()
            .filter(|outcome| outcome.allowed() && outcome.env == env && outcome.payload == payload)
    }
}
