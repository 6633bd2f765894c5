//! Error types for the demand planning engine.

use thiserror::Error;

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, PlanningError>;

/// Errors that can occur while planning a SKU or a batch.
///
/// Non-finite derived numbers are never surfaced through this type; they are
/// coerced to unset optional fields at the point of computation. A single
/// SKU's error is isolated by the batch runner and never aborts siblings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Fewer observations than the stage requires.
    #[error("insufficient history: need at least {needed}, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// The requested forecast backend is not compiled in or not enabled.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Request-level contract violation, rejected before any per-SKU work.
    #[error("missing required mapping: {0}")]
    MissingRequiredMapping(String),

    /// A backend's fit or predict step failed.
    #[error("backend computation failed: {0}")]
    BackendComputation(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between aligned structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = PlanningError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = PlanningError::InsufficientHistory { needed: 3, got: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient history: need at least 3, got 1"
        );

        let err = PlanningError::MissingRequiredMapping("no demand column".to_string());
        assert_eq!(
            err.to_string(),
            "missing required mapping: no demand column"
        );

        let err = PlanningError::DimensionMismatch { expected: 5, got: 3 };
        assert_eq!(err.to_string(), "dimension mismatch: expected 5, got 3");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = PlanningError::FitRequired;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
