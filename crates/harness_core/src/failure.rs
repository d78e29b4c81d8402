//! Interpreter failure vocabulary.
//!
//! A runtime reports a failed run as an [`InterpreterFailure`] (a classification such as `ZeroDivisionError`
//! plus an optional message). Error-expecting runs turn that into data: an [`ErrorOutcome`] which is either the
//! failure's canonical description or the distinct `NoError` tag.

use std::fmt;

use thiserror::Error;

/// Text shown for [`ErrorOutcome::NoError`] in reports.
///
/// Only a rendering: the outcome itself is a tag, so a real failure whose description reads the same never
/// compares equal to it.
pub const NO_ERROR_SENTINEL: &str = "no error!";

/// An interpreter-level failure raised while running a script.
///
/// Renders as `Kind: message`, or just `Kind` when there is no message, the same shape a Python-like
/// traceback ends with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", .kind, message_suffix(.message))]
pub struct InterpreterFailure {
    kind: String,
    message: Option<String>,
}

impl InterpreterFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: kind.into(),
            message: (!message.is_empty()).then_some(message),
        }
    }

    /// A failure with a classification and no message (e.g. a bare `raise KeyboardInterrupt`).
    pub fn bare(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: None,
        }
    }

    /// Parse a `Kind: message` line, as printed at the end of a traceback.
    ///
    /// ## Returns
    /// - `None` when the line is empty or has no classification.
    ///
    /// ## Notes
    /// - Splits on the first `": "`; everything after it (including further colons) is the message.
    pub fn from_description(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match line.split_once(": ") {
            Some((kind, message)) if !kind.trim().is_empty() => Some(Self::new(kind.trim(), message)),
            Some(_) => None,
            None => Some(Self::bare(line.trim_end_matches(':'))),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Result of an error-expecting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// The script raised; carries the failure's canonical description.
    Raised(String),
    /// The script completed without raising.
    NoError,
}

impl ErrorOutcome {
    pub fn raised(failure: &InterpreterFailure) -> Self {
        ErrorOutcome::Raised(failure.to_string())
    }

    /// The description of the raised failure, if any.
    pub fn description(&self) -> Option<&str> {
        match self {
            ErrorOutcome::Raised(description) => Some(description),
            ErrorOutcome::NoError => None,
        }
    }

    pub fn is_no_error(&self) -> bool {
        matches!(self, ErrorOutcome::NoError)
    }

    /// `true` only for a raised failure whose description equals `expected` exactly.
    pub fn matches(&self, expected: &str) -> bool {
        self.description() == Some(expected)
    }
}

impl fmt::Display for ErrorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOutcome::Raised(description) => f.write_str(description),
            ErrorOutcome::NoError => f.write_str(NO_ERROR_SENTINEL),
        }
    }
}

impl From<Result<(), InterpreterFailure>> for ErrorOutcome {
    fn from(result: Result<(), InterpreterFailure>) -> Self {
        match result {
            Ok(()) => ErrorOutcome::NoError,
            Err(failure) => ErrorOutcome::raised(&failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_with_message() {
        let failure = InterpreterFailure::new("ZeroDivisionError", "division by zero");
        assert_eq!(failure.to_string(), "ZeroDivisionError: division by zero");
    }

    #[test]
    fn test_failure_empty_message_is_bare() {
        let failure = InterpreterFailure::new("StopIteration", "");
        assert_eq!(failure.message(), None);
        assert_eq!(failure.to_string(), "StopIteration");
    }

    #[test]
    fn test_from_description_splits_on_first_separator() {
        let failure = InterpreterFailure::from_description("KeyError: 'a: b'").unwrap();
        assert_eq!(failure.kind(), "KeyError");
        assert_eq!(failure.message(), Some("'a: b'"));
    }

    #[test]
    fn test_from_description_bare_kind() {
        let failure = InterpreterFailure::from_description("  KeyboardInterrupt\n").unwrap();
        assert_eq!(failure.kind(), "KeyboardInterrupt");
        assert_eq!(failure.message(), None);
    }

    #[test]
    fn test_from_description_rejects_blank() {
        assert!(InterpreterFailure::from_description("   ").is_none());
        assert!(InterpreterFailure::from_description(": orphan").is_none());
    }

    #[test]
    fn test_no_error_renders_sentinel() {
        assert_eq!(ErrorOutcome::NoError.to_string(), NO_ERROR_SENTINEL);
        assert!(!ErrorOutcome::NoError.to_string().is_empty());
    }

    #[test]
    fn test_sentinel_text_never_matches_no_error() {
        assert!(!ErrorOutcome::NoError.matches(NO_ERROR_SENTINEL));
        assert!(ErrorOutcome::Raised(NO_ERROR_SENTINEL.to_string()).matches(NO_ERROR_SENTINEL));
        assert_ne!(ErrorOutcome::NoError, ErrorOutcome::Raised(NO_ERROR_SENTINEL.to_string()));
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(ErrorOutcome::from(Ok(())), ErrorOutcome::NoError);
        let outcome = ErrorOutcome::from(Err(InterpreterFailure::new("ValueError", "bad")));
        assert_eq!(outcome.description(), Some("ValueError: bad"));
    }
}
