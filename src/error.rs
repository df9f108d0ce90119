//! Solver error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by configuration handling, instance reading and the
/// final feasibility check.
///
/// Malformed instance files are reported by the caller as warnings so that
/// remaining instances can still be processed; everything else aborts the
/// run with a non-zero exit code.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The merged configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The instance file could not be opened.
    #[error("input file {path:?} is not readable: {source}")]
    UnreadableInstance {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The instance file does not follow the Solomon benchmark layout.
    #[error("input file {path:?} is malformed: {reason}")]
    MalformedInstance {
        /// Path of the offending file.
        path: PathBuf,
        /// What went wrong while parsing.
        reason: String,
    },

    /// The produced best solution violates an invariant. This is a bug.
    #[error("solution is not feasible: {0}")]
    InfeasibleSolution(String),

    /// No instance could be processed at all.
    #[error("no readable input instances")]
    NoInput,

    /// Failure writing result or detail files.
    #[error("output error: {0}")]
    Io(#[from] io::Error),

    /// Failure emitting CSV result rows.
    #[error("result output error: {0}")]
    Output(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_config() {
        let e = SolverError::InvalidConfig("both budgets are zero".into());
        assert_eq!(
            e.to_string(),
            "invalid configuration: both budgets are zero"
        );
    }

    #[test]
    fn test_display_malformed() {
        let e = SolverError::MalformedInstance {
            path: PathBuf::from("x.txt"),
            reason: "no capacity line".into(),
        };
        assert!(e.to_string().contains("x.txt"));
        assert!(e.to_string().contains("no capacity line"));
    }
}
