//! Property-based tests for capture normalization, failure descriptions and locator ordering
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use std::path::PathBuf;

use proptest::prelude::*;
use script_harness::config::{BasePrefix, LocatorLayout};
use script_harness::testing::{CalcRuntime, MemoryProbe};
use script_harness::{ErrorOutcome, Harness, HarnessConfig, InterpreterFailure, ResourceLocator, normalize_newlines};

// =============================================================================
// Normalization Properties
// =============================================================================

/// Lines of printable text without line terminators.
fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9 %.:'-]{0,12}", 0..8)
}

/// Program-like output: lines ending in LF after zero or more carriage returns, with stray `\r` mid-line.
fn output_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z%\r]{0,8}", 0usize..3), 0..6).prop_map(|lines| {
        lines
            .into_iter()
            .map(|(line, carriage_returns)| format!("{line}{}\n", "\r".repeat(carriage_returns)))
            .collect()
    })
}

proptest! {
    /// Property: normalizing twice is the same as normalizing once
    #[test]
    fn normalization_is_idempotent(text in output_strategy()) {
        let once = normalize_newlines(&text).into_owned();
        let twice = normalize_newlines(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    /// Property: CRLF and LF renderings of the same lines normalize identically
    #[test]
    fn line_ending_conventions_converge(lines in lines_strategy()) {
        let unix = lines.iter().map(|l| format!("{l}\n")).collect::<String>();
        let windows = lines.iter().map(|l| format!("{l}\r\n")).collect::<String>();
        prop_assert_eq!(normalize_newlines(&unix), normalize_newlines(&windows));
        prop_assert_eq!(normalize_newlines(&windows).into_owned(), unix);
    }

    /// Property: normalized text never contains a CRLF pair
    #[test]
    fn normalized_text_has_no_crlf(text in output_strategy()) {
        prop_assert!(!normalize_newlines(&text).contains("\r\n"));
    }

    /// Property: arbitrary mixes of `\r` and `\n` are a fixed point after one normalization
    #[test]
    fn raw_line_ending_soup_is_idempotent(text in "[a\r\n]{0,40}") {
        let once = normalize_newlines(&text).into_owned();
        prop_assert!(!once.contains("\r\n"));
        prop_assert_eq!(normalize_newlines(&once), once.as_str());
    }
}

// =============================================================================
// Failure Description Properties
// =============================================================================

fn kind_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{0,15}(Error|Exception)"
}

proptest! {
    /// Property: a rendered failure parses back to the same failure
    #[test]
    fn failure_description_round_trips(kind in kind_strategy(), message in "[a-z0-9 ':]{1,20}") {
        let message = message.trim().to_string();
        prop_assume!(!message.is_empty());
        let failure = InterpreterFailure::new(kind, message);
        let parsed = InterpreterFailure::from_description(&failure.to_string());
        prop_assert_eq!(parsed, Some(failure));
    }

    /// Property: no raised description ever equals the no-error outcome
    #[test]
    fn raised_never_matches_no_error(description in ".{0,30}") {
        let raised = ErrorOutcome::Raised(description.clone());
        prop_assert_ne!(&raised, &ErrorOutcome::NoError);
        prop_assert!(!ErrorOutcome::NoError.matches(&description));
    }
}

// =============================================================================
// Locator Properties
// =============================================================================

proptest! {
    /// Property: with every base present, the first declared prefix always wins
    #[test]
    fn first_declared_base_wins(prefixes in prop::collection::btree_set("[a-z]{1,6}", 1..5)) {
        let prefixes: Vec<String> = prefixes.into_iter().collect();
        let mut probe = MemoryProbe::new();
        for prefix in &prefixes {
            probe = probe.with_file(PathBuf::from(prefix).join("root").join("s.py"));
        }
        let layout = LocatorLayout::new("root")
            .with_base_prefixes(prefixes.iter().map(|p| BasePrefix::new(p.clone(), p.clone())));
        let locator = ResourceLocator::from_layout(&layout, probe);
        prop_assert_eq!(locator.locate("s.py").unwrap(), PathBuf::from(&prefixes[0]).join("root").join("s.py"));
    }

    /// Property: with no base present, location always fails and never yields a path
    #[test]
    fn no_base_never_resolves(prefixes in prop::collection::vec("[a-z]{1,6}", 0..4), script in "[a-z]{1,8}\\.py") {
        let layout = LocatorLayout::new("root")
            .with_base_prefixes(prefixes.iter().map(|p| BasePrefix::new(p.clone(), p.clone())));
        let locator = ResourceLocator::from_layout(&layout, MemoryProbe::new());
        prop_assert!(locator.locate(&script).is_err());
    }
}

// =============================================================================
// Capture Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: printing integers captures exactly their decimal text, on every run
    #[test]
    fn integer_prints_are_captured_exactly(values in prop::collection::vec(-1000i64..1000, 1..6)) {
        let harness = Harness::with_probe(CalcRuntime::new(), &HarnessConfig::default(), MemoryProbe::new());
        let code = values.iter().map(|v| format!("print({v})")).collect::<Vec<_>>().join("\n");
        let expected = values.iter().map(|v| format!("{v}\n")).collect::<String>();
        for _ in 0..2 {
            prop_assert!(harness.assert_prints(&expected, &code).is_ok());
        }
    }
}
