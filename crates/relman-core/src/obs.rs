//! Structured observability hooks for release staging and submission.
//!
//! This module provides:
//! - Package-scoped tracing spans via the `PackageSpan` RAII guard
//! - Emission functions for key lifecycle events: staging, persistence,
//!   gate evaluation, package creation
//!
//! Events are emitted at `info!` level; anomalies (discarded entries, failed
//! creations) at `warn!`.

use tracing::{info, warn};

/// RAII guard that enters a package-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = PackageSpan::enter("releaseItem");
/// // All tracing calls are now tagged with package = "releaseItem"
/// ```
pub struct PackageSpan {
    _span: tracing::span::EnteredSpan,
}

impl PackageSpan {
    /// Create and enter a span tagged with the package name.
    pub fn enter(package: &str) -> Self {
        let span = tracing::info_span!("relman.package", package = %package);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a new item appended to the working set.
pub fn emit_item_added(package: &str, key: &str) {
    info!(event = "working_set.item_added", package = %package, key = %key);
}

/// Emit event: an incoming item folded into an existing entry.
pub fn emit_item_merged(package: &str, key: &str) {
    info!(event = "working_set.item_merged", package = %package, key = %key);
}

/// Emit event: an incoming item rejected, with the reason shown to the user.
pub fn emit_item_rejected(package: &str, key: &str, reason: &dyn std::fmt::Display) {
    info!(event = "working_set.item_rejected", package = %package, key = %key, reason = %reason);
}

/// Emit event: working set written to its store.
pub fn emit_set_persisted(package: &str, items: usize) {
    info!(event = "working_set.persisted", package = %package, items = items);
}

/// Emit event: working set restored from its store.
pub fn emit_set_restored(package: &str, items: usize) {
    info!(event = "working_set.restored", package = %package, items = items);
}

/// Emit event: unreadable stored entry discarded (warning level).
pub fn emit_entry_discarded(package: &str, error: &dyn std::fmt::Display) {
    warn!(event = "working_set.entry_discarded", package = %package, error = %error);
}

/// Emit event: gate evaluation completed with its verdict.
pub fn emit_gate_evaluated(env: &str, allowed: bool, violations: usize) {
    info!(
        event = "gate.evaluated",
        env = %env,
        allowed = allowed,
        violations = violations,
    );
}

/// Emit event: a gate outcome arrived for an environment that is no longer
/// selected and was dropped.
pub fn emit_stale_outcome_discarded(outcome_env: &str, selected_env: &str) {
    info!(
        event = "gate.stale_outcome_discarded",
        outcome_env = %outcome_env,
        selected_env = %selected_env,
    );
}

/// Emit event: package created by the backend.
pub fn emit_package_created(package: &str, version: &str) {
    info!(event = "package.created", package = %package, version = %version);
}

/// Emit event: backend rejected the package creation (warning level).
pub fn emit_package_create_failed(package: &str, message: &str) {
    warn!(event = "package.create_failed", package = %package, message = %message);
}

/// Emit event: draft entry could not be cleared after creation (warning
/// level).
pub fn emit_draft_clear_failed(package: &str, error: &dyn std::fmt::Display) {
    warn!(event = "package.draft_clear_failed", package = %package, error = %error);
}

/// Emit event: named package opened into a working set.
pub fn emit_package_opened(package: &str, items: usize) {
    info!(event = "package.opened", package = %package, items = items);
}

/// Emit event: named package cloned into the draft.
pub fn emit_package_cloned(package: &str, items: usize) {
    info!(event = "package.cloned", package = %package, items = items);
}
