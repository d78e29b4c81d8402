//! Verification strategies
//!
//! Applied after capture, on normalized text only:
//!
//! - **Exact**: stdout equals the expected text.
//! - **Contains**: stdout contains the expected substring.
//! - **Error**: an error-expecting run raised a failure whose description equals the expected one.
//! - **Clean run**: stderr is empty *and* stdout is not. Each conjunct is checked on its own.

use std::fmt;

use harness_core::ErrorOutcome;
use thiserror::Error;

use crate::context::CapturedOutput;

/// Which strategy produced a mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Exact,
    Contains,
    Error,
    NoError,
    CleanRun,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Exact => write!(f, "exact output"),
            Strategy::Contains => write!(f, "output containment"),
            Strategy::Error => write!(f, "error"),
            Strategy::NoError => write!(f, "no error"),
            Strategy::CleanRun => write!(f, "clean run"),
        }
    }
}

/// What a caller expects from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Stdout must equal this text.
    Exact(String),
    /// Stdout must contain this text.
    Contains(String),
    /// The run must raise a failure with exactly this description.
    Error(String),
    /// The run must not raise.
    NoError,
    /// Stderr must be empty and stdout must not be.
    CleanRun,
}

impl Expectation {
    pub fn strategy(&self) -> Strategy {
        match self {
            Expectation::Exact(_) => Strategy::Exact,
            Expectation::Contains(_) => Strategy::Contains,
            Expectation::Error(_) => Strategy::Error,
            Expectation::NoError => Strategy::NoError,
            Expectation::CleanRun => Strategy::CleanRun,
        }
    }

    /// Whether checking this expectation needs an error-expecting run.
    pub fn expects_failure_channel(&self) -> bool {
        matches!(self, Expectation::Error(_) | Expectation::NoError)
    }
}

/// A captured value that did not satisfy an expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{} mismatch\n  expected: {}\n  actual:   {}{}",
    .strategy, .expected, .actual, stderr_note(.stderr)
)]
pub struct AssertionMismatch {
    pub strategy: Strategy,
    pub expected: String,
    pub actual: String,
    /// Captured stderr of the run, attached so tracebacks are visible in the report
    pub stderr: String,
}

impl AssertionMismatch {
    fn new(strategy: Strategy, expected: String, actual: String) -> Self {
        Self {
            strategy,
            expected,
            actual,
            stderr: String::new(),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

fn stderr_note(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n  stderr:\n{}", indent(stderr))
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}")).collect::<Vec<_>>().join("\n")
}

/// Captured text equals `expected` exactly.
pub fn exact(expected: &str, actual: &str) -> Result<(), AssertionMismatch> {
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionMismatch::new(Strategy::Exact, format!("{expected:?}"), format!("{actual:?}")))
    }
}

/// Captured text contains `expected` anywhere.
pub fn contains(expected: &str, actual: &str) -> Result<(), AssertionMismatch> {
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(AssertionMismatch::new(
            Strategy::Contains,
            format!("text containing {expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

/// The run raised and its description equals `expected` exactly.
///
/// A run that did not raise never matches, whatever `expected` says.
pub fn error(expected: &str, outcome: &ErrorOutcome) -> Result<(), AssertionMismatch> {
    if outcome.matches(expected) {
        Ok(())
    } else {
        Err(AssertionMismatch::new(Strategy::Error, expected.to_string(), outcome.to_string()))
    }
}

/// The run did not raise.
pub fn no_error(outcome: &ErrorOutcome) -> Result<(), AssertionMismatch> {
    if outcome.is_no_error() {
        Ok(())
    } else {
        Err(AssertionMismatch::new(
            Strategy::NoError,
            ErrorOutcome::NoError.to_string(),
            outcome.to_string(),
        ))
    }
}

/// Stderr is empty and stdout is not.
pub fn clean_run(output: &CapturedOutput) -> Result<(), AssertionMismatch> {
    if !output.stderr.is_empty() {
        return Err(AssertionMismatch::new(
            Strategy::CleanRun,
            "empty stderr".to_string(),
            format!("{:?}", output.stderr),
        ));
    }
    if output.stdout.is_empty() {
        return Err(AssertionMismatch::new(
            Strategy::CleanRun,
            "non-empty stdout".to_string(),
            "empty stdout".to_string(),
        ));
    }
    Ok(())
}

/// Check an output-based expectation against a capture.
///
/// Failure-channel expectations (`Error`, `NoError`) are checked with [`check_error`] instead; passing one here
/// is reported as a mismatch against the capture.
pub fn check_output(expectation: &Expectation, output: &CapturedOutput) -> Result<(), AssertionMismatch> {
    let result = match expectation {
        Expectation::Exact(expected) => exact(expected, &output.stdout),
        Expectation::Contains(expected) => contains(expected, &output.stdout),
        Expectation::CleanRun => return clean_run(output),
        Expectation::Error(expected) => Err(AssertionMismatch::new(
            Strategy::Error,
            expected.clone(),
            "a run checked on its output".to_string(),
        )),
        Expectation::NoError => Err(AssertionMismatch::new(
            Strategy::NoError,
            ErrorOutcome::NoError.to_string(),
            "a run checked on its output".to_string(),
        )),
    };
    result.map_err(|mismatch| mismatch.with_stderr(output.stderr.clone()))
}

/// Check a failure-channel expectation against an error outcome.
pub fn check_error(expectation: &Expectation, outcome: &ErrorOutcome) -> Result<(), AssertionMismatch> {
    match expectation {
        Expectation::Error(expected) => error(expected, outcome),
        Expectation::NoError => no_error(outcome),
        other => Err(AssertionMismatch::new(
            other.strategy(),
            "an output-based check".to_string(),
            outcome.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(stdout: &str, stderr: &str) -> CapturedOutput {
        CapturedOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_exact_pass_and_fail() {
        assert!(exact("2\n", "2\n").is_ok());
        let mismatch = exact("2\n", "3\n").unwrap_err();
        assert_eq!(mismatch.strategy, Strategy::Exact);
        assert_eq!(mismatch.expected, "\"2\\n\"");
        assert_eq!(mismatch.actual, "\"3\\n\"");
    }

    #[test]
    fn test_exact_is_not_containment() {
        assert!(exact("2", "2\n").is_err());
    }

    #[test]
    fn test_contains() {
        assert!(contains("world", "hello world\n").is_ok());
        assert!(contains("", "anything").is_ok());
        assert_eq!(contains("x", "abc").unwrap_err().strategy, Strategy::Contains);
    }

    #[test]
    fn test_error_matches_exact_description() {
        let outcome = ErrorOutcome::Raised("ZeroDivisionError: division by zero".to_string());
        assert!(error("ZeroDivisionError: division by zero", &outcome).is_ok());
        assert!(error("ZeroDivisionError", &outcome).is_err());
    }

    #[test]
    fn test_error_against_clean_run_reports_sentinel() {
        let mismatch = error("ValueError: bad", &ErrorOutcome::NoError).unwrap_err();
        assert_eq!(mismatch.actual, "no error!");
    }

    #[test]
    fn test_sentinel_text_as_expected_error_never_passes_clean_run() {
        assert!(error("no error!", &ErrorOutcome::NoError).is_err());
    }

    #[test]
    fn test_no_error() {
        assert!(no_error(&ErrorOutcome::NoError).is_ok());
        let mismatch = no_error(&ErrorOutcome::Raised("KeyError: 'k'".to_string())).unwrap_err();
        assert_eq!(mismatch.actual, "KeyError: 'k'");
    }

    #[test]
    fn test_clean_run_requires_empty_stderr() {
        let mismatch = clean_run(&captured("ok\n", "warning\n")).unwrap_err();
        assert_eq!(mismatch.expected, "empty stderr");
    }

    #[test]
    fn test_clean_run_requires_stdout() {
        let mismatch = clean_run(&captured("", "")).unwrap_err();
        assert_eq!(mismatch.expected, "non-empty stdout");
    }

    #[test]
    fn test_clean_run_passes() {
        assert!(clean_run(&captured("1.23s\n", "")).is_ok());
    }

    #[test]
    fn test_check_output_attaches_stderr() {
        let mismatch = check_output(
            &Expectation::Exact("2\n".to_string()),
            &captured("", "Traceback\nNameError: x\n"),
        )
        .unwrap_err();
        assert_eq!(mismatch.stderr, "Traceback\nNameError: x\n");
        assert!(mismatch.to_string().contains("    NameError: x"));
    }

    #[test]
    fn test_check_output_rejects_failure_channel_expectations() {
        assert!(check_output(&Expectation::NoError, &captured("x", "")).is_err());
        assert!(check_output(&Expectation::Error("E".to_string()), &captured("x", "")).is_err());
    }

    #[test]
    fn test_check_error_dispatch() {
        let raised = ErrorOutcome::Raised("E: m".to_string());
        assert!(check_error(&Expectation::Error("E: m".to_string()), &raised).is_ok());
        assert!(check_error(&Expectation::NoError, &ErrorOutcome::NoError).is_ok());
        assert!(check_error(&Expectation::CleanRun, &raised).is_err());
    }

    #[test]
    fn test_expectation_strategy() {
        assert_eq!(Expectation::CleanRun.strategy(), Strategy::CleanRun);
        assert!(Expectation::NoError.expects_failure_channel());
        assert!(!Expectation::Contains(String::new()).expects_failure_channel());
    }

    #[test]
    fn test_mismatch_display_without_stderr() {
        let mismatch = exact("a", "b").unwrap_err();
        assert_eq!(mismatch.to_string(), "exact output mismatch\n  expected: \"a\"\n  actual:   \"b\"");
    }
}
