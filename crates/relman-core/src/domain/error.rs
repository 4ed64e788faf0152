//! Domain-level error taxonomy for the release console.
//!
//! Conflicting or duplicate adds are not errors; they come back as
//! `AddOutcome::Rejected` values from the working set. Errors here cover the
//! cases that block an action outright: bad indices, missing gate clearance,
//! storage and backend failures.

use crate::domain::environment::ReleaseEnvironment;

/// Release console domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("item index {index} out of range (set holds {len} items)")]
    OutOfRange { index: usize, len: usize },

    #[error("working set is empty")]
    EmptyWorkingSet,

    #[error("no gate clearance for {env}: run the sensitivity check against the current items first")]
    GateNotPassed { env: ReleaseEnvironment },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("storage error: {0}")]
    Storage(#[from] relman_store::StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for release console operations.
pub type Result<T> = std::result::Result<T, ReleaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = ReleaseError::OutOfRange { index: 4, len: 2 };
        let msg = err.to_string();
        assert!(msg.contains("4"));
        assert!(msg.contains("2"));
    }

    #[test]
    fn test_gate_not_passed_names_environment() {
        let err = ReleaseError::GateNotPassed {
            env: ReleaseEnvironment::Prod,
        };
        assert!(err.to_string().contains("Prod"));
    }

    #[test]
    fn test_backend_error_carries_message() {
        let err = ReleaseError::Backend("scheduler responded with 503".to_string());
        assert!(err.to_string().contains("503"));
    }
}
