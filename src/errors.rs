//! Harness error taxonomy.
//!
//! Resource-location failures and unexpected interpreter failures propagate immediately; there is no partial
//! result and no retry. Expected failures never show up here: the error-expecting entry point turns them into
//! an [`ErrorOutcome`](harness_core::ErrorOutcome) instead.

use std::path::PathBuf;

use harness_core::InterpreterFailure;
use miette::Diagnostic;
use thiserror::Error;

use crate::verify::AssertionMismatch;

/// Errors raised by the resource locator, the execution harness and the verification strategies.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// None of the candidate base directories for a logical root exists.
    #[error("unable to locate {root}")]
    #[diagnostic(
        code(harness::configuration),
        help("run from the project checkout or its parent, or adjust the locator layout")
    )]
    Configuration { root: String, tried: Vec<PathBuf> },

    /// A base directory exists but the script cannot be opened under any sub-root.
    #[error("unable to locate {script} (tried: {})", display_paths(.attempted))]
    #[diagnostic(code(harness::resource_not_found))]
    ResourceNotFound { script: String, attempted: Vec<PathBuf> },

    /// The runtime failed while the caller expected a clean run.
    #[error("interpreter failure: {0}")]
    #[diagnostic(code(harness::interpreter))]
    Interpreter(#[from] InterpreterFailure),

    /// A captured value did not satisfy the expectation.
    #[error(transparent)]
    #[diagnostic(code(harness::mismatch))]
    Mismatch(#[from] AssertionMismatch),

    #[error("I/O error: {0}")]
    #[diagnostic(code(harness::io))]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// `true` for the two resource-location failures.
    pub fn is_location_error(&self) -> bool {
        matches!(self, HarnessError::Configuration { .. } | HarnessError::ResourceNotFound { .. })
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_names_root() {
        let err = HarnessError::Configuration {
            root: "benchmarks/src".to_string(),
            tried: vec![PathBuf::from("../benchmarks/src")],
        };
        assert_eq!(err.to_string(), "unable to locate benchmarks/src");
        assert!(err.is_location_error());
    }

    #[test]
    fn test_resource_not_found_lists_attempts() {
        let err = HarnessError::ResourceNotFound {
            script: "missing.py".to_string(),
            attempted: vec![PathBuf::from("a/missing.py"), PathBuf::from("b/missing.py")],
        };
        assert_eq!(err.to_string(), "unable to locate missing.py (tried: a/missing.py, b/missing.py)");
    }

    #[test]
    fn test_interpreter_failure_converts() {
        let err: HarnessError = InterpreterFailure::new("NameError", "name 'x' is not defined").into();
        assert!(!err.is_location_error());
        assert_eq!(err.to_string(), "interpreter failure: NameError: name 'x' is not defined");
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = HarnessError::Configuration {
            root: "tests".to_string(),
            tried: Vec::new(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("harness::configuration"));
    }
}
