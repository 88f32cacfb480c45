//! Error types for the Gains Tracker core

use thiserror::Error;

/// Failure taxonomy of the core.
///
/// None of these are allowed to escape the aggregator boundary as a fault:
/// services translate them into empty/zero read models plus an advisory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Document store or health provider unreachable or access denied
    #[error("External service unavailable: {0}")]
    ExternalUnavailable(String),

    /// Input text that could not be interpreted (e.g. a non-numeric quantity)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The workout classifier failed for one recommendation slot
    #[error("Classifier failure: {0}")]
    ClassifierFailure(String),

    /// A progress fraction was requested against a zero goal
    #[error("Goal is zero")]
    GoalDivisionByZero,
}

impl CoreError {
    /// Short user-facing advisory for this failure
    pub fn advisory(&self) -> String {
        match self {
            CoreError::ExternalUnavailable(_) => {
                "Data is temporarily unavailable; showing the last known values".to_string()
            }
            CoreError::MalformedInput(_) => "Input was not understood; reverted".to_string(),
            CoreError::ClassifierFailure(_) => "Some recommendations are unavailable".to_string(),
            CoreError::GoalDivisionByZero => "No goal set".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_never_leaks_details() {
        let err = CoreError::ExternalUnavailable("connection refused on 10.0.0.3".to_string());
        assert!(!err.advisory().contains("10.0.0.3"));
        assert!(err.to_string().contains("10.0.0.3"));
    }
}
