//! Execution, capture and verification harness
//!
//! Every operation builds its own [`ExecutionContext`] with in-memory sinks, runs the runtime once, reads the
//! capture back (decoded and newline-normalized) and drops the context. No state is shared between calls, so
//! invocations are safe to run from parallel test threads.
//!
//! ## Entry points
//!
//! | Call | Source | Check |
//! |------|--------|-------|
//! | `assert_prints` / `assert_prints_script` | text / test script | stdout equals expected |
//! | `assert_print_contains` / `assert_print_contains_script` | text / test script | stdout contains expected |
//! | `assert_error` | text | failure description equals expected |
//! | `assert_bench_no_error` | benchmark script | stderr empty, stdout non-empty |
//! | `parse_output` / `parse_result` | text | none (parse only) |

use std::path::Path;

use harness_core::ErrorOutcome;

use crate::config::HarnessConfig;
use crate::context::{CapturedOutput, ExecutionContext, RuntimeOptions};
use crate::errors::{HarnessError, HarnessResult};
use crate::locator::{Probe, RealFs, ResourceLocator};
use crate::runtime::ScriptRuntime;
use crate::source::SourceUnit;
use crate::verify::{self, Expectation};

/// What one run wrote, plus the runtime's result.
#[derive(Debug)]
pub struct RunCapture<T> {
    pub output: CapturedOutput,
    pub outcome: T,
}

/// Where a source comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptInput {
    /// Inline source text
    Code(String),
    /// Script name resolved under the tests root
    TestScript(std::path::PathBuf),
    /// Script name resolved under the benchmarks root
    BenchScript(std::path::PathBuf),
    /// A path used as-is
    File(std::path::PathBuf),
}

/// Runs sources through a runtime with captured I/O and checks the result.
#[derive(Debug)]
pub struct Harness<R> {
    runtime: R,
    source_name: String,
    tests: ResourceLocator,
    benchmarks: ResourceLocator,
}

impl<R: ScriptRuntime> Harness<R> {
    /// Harness with the default configuration, probing the real file system.
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, &HarnessConfig::default())
    }

    pub fn with_config(runtime: R, config: &HarnessConfig) -> Self {
        Self::with_probe(runtime, config, RealFs)
    }

    /// Harness whose locators probe through `probe`.
    pub fn with_probe<P: Probe + Clone + 'static>(runtime: R, config: &HarnessConfig, probe: P) -> Self {
        Self {
            runtime,
            source_name: config.source_name.clone(),
            tests: ResourceLocator::from_layout(&config.tests, probe.clone()),
            benchmarks: ResourceLocator::from_layout(&config.benchmarks, probe),
        }
    }

    /// Harness with explicitly built locators.
    pub fn with_locators(
        runtime: R,
        source_name: impl Into<String>,
        tests: ResourceLocator,
        benchmarks: ResourceLocator,
    ) -> Self {
        Self {
            runtime,
            source_name: source_name.into(),
            tests,
            benchmarks,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn tests_locator(&self) -> &ResourceLocator {
        &self.tests
    }

    pub fn benchmarks_locator(&self) -> &ResourceLocator {
        &self.benchmarks
    }

    // ========================================================================
    // Sources
    // ========================================================================

    /// Inline text under the configured synthetic name.
    pub fn text_source(&self, code: impl Into<String>) -> SourceUnit {
        SourceUnit::from_text(code, self.source_name.clone())
    }

    /// Resolve a test script and load it.
    pub fn test_source(&self, script: impl AsRef<Path>) -> HarnessResult<SourceUnit> {
        let path = self.tests.locate(script)?;
        load(&path)
    }

    /// Resolve a benchmark script and load it.
    pub fn bench_source(&self, script: impl AsRef<Path>) -> HarnessResult<SourceUnit> {
        let path = self.benchmarks.locate(script)?;
        load(&path)
    }

    pub fn source_for(&self, input: &ScriptInput) -> HarnessResult<SourceUnit> {
        match input {
            ScriptInput::Code(code) => Ok(self.text_source(code.clone())),
            ScriptInput::TestScript(name) => self.test_source(name),
            ScriptInput::BenchScript(name) => self.bench_source(name),
            ScriptInput::File(path) => load(path),
        }
    }

    // ========================================================================
    // Core operations
    // ========================================================================

    /// Run `source` with `args`, capturing both streams.
    ///
    /// ## Errors
    /// - `HarnessError::Interpreter` when the runtime returns a failure.
    #[tracing::instrument(skip_all, fields(source = %source.name(), argc = args.len()))]
    pub fn run_and_capture(&self, source: &SourceUnit, args: &[String]) -> HarnessResult<RunCapture<R::Outcome>> {
        let mut ctx = fresh_context();
        let outcome = self.runtime.run_script(args, source, &mut ctx)?;
        let output = ctx.into_captured();
        tracing::trace!(stdout_len = output.stdout.len(), stderr_len = output.stderr.len(), "captured");
        Ok(RunCapture { output, outcome })
    }

    /// Run `source` with `args` expecting it to raise.
    ///
    /// Never fails: a raised failure becomes `ErrorOutcome::Raised` with its canonical description, and a clean
    /// run becomes `ErrorOutcome::NoError`.
    #[tracing::instrument(skip_all, fields(source = %source.name()))]
    pub fn run_expecting_error(&self, source: &SourceUnit, args: &[String]) -> ErrorOutcome {
        let mut ctx = fresh_context();
        let result = self.runtime.run_script_surfacing(args, source, &mut ctx).map(|_| ());
        drop(ctx);
        let outcome = ErrorOutcome::from(result);
        tracing::debug!(%outcome, "error-expecting run finished");
        outcome
    }

    /// Parse `source` without running it, capturing parse-phase output.
    #[tracing::instrument(skip_all, fields(source = %source.name()))]
    pub fn run_parse_only(&self, source: &SourceUnit) -> HarnessResult<RunCapture<R::Outcome>> {
        let mut ctx = fresh_context();
        let outcome = self.runtime.parse_only(&mut ctx, source)?;
        Ok(RunCapture {
            output: ctx.into_captured(),
            outcome,
        })
    }

    /// Check any expectation against `input`.
    ///
    /// Failure-channel expectations use an error-expecting run, the others a capturing run. Both receive `args`.
    pub fn check(&self, expectation: &Expectation, input: &ScriptInput, args: &[String]) -> HarnessResult<()> {
        let source = self.source_for(input)?;
        if expectation.expects_failure_channel() {
            let outcome = self.run_expecting_error(&source, args);
            return verify::check_error(expectation, &outcome).map_err(mismatch);
        }
        let capture = self.run_and_capture(&source, args)?;
        verify::check_output(expectation, &capture.output).map_err(mismatch)
    }

    // ========================================================================
    // Assertions
    // ========================================================================

    /// Stdout of running `code` equals `expected`.
    pub fn assert_prints(&self, expected: &str, code: &str) -> HarnessResult<R::Outcome> {
        let capture = self.run_and_capture(&self.text_source(code), &[])?;
        expect_output(&Expectation::Exact(expected.to_string()), capture)
    }

    /// Stdout of running the test script `script` equals `expected`.
    pub fn assert_prints_script(&self, expected: &str, script: impl AsRef<Path>) -> HarnessResult<R::Outcome> {
        let source = self.test_source(script)?;
        let capture = self.run_and_capture(&source, &[])?;
        expect_output(&Expectation::Exact(expected.to_string()), capture)
    }

    /// Stdout of running `code` contains `expected`.
    pub fn assert_print_contains(&self, expected: &str, code: &str) -> HarnessResult<R::Outcome> {
        let capture = self.run_and_capture(&self.text_source(code), &[])?;
        expect_output(&Expectation::Contains(expected.to_string()), capture)
    }

    /// Stdout of running the test script `script` contains `expected`.
    pub fn assert_print_contains_script(&self, expected: &str, script: impl AsRef<Path>) -> HarnessResult<R::Outcome> {
        let source = self.test_source(script)?;
        let capture = self.run_and_capture(&source, &[])?;
        expect_output(&Expectation::Contains(expected.to_string()), capture)
    }

    /// Running `code` raises a failure described exactly as `expected`.
    pub fn assert_error(&self, expected: &str, code: &str) -> HarnessResult<()> {
        let outcome = self.run_expecting_error(&self.text_source(code), &[]);
        verify::error(expected, &outcome).map_err(mismatch)
    }

    /// The benchmark `script`, run with `[script, arg]`, writes to stdout and nothing to stderr.
    pub fn assert_bench_no_error(&self, script: impl AsRef<Path>, arg: &str) -> HarnessResult<R::Outcome> {
        let script = script.as_ref();
        let source = self.bench_source(script)?;
        let args = [script.display().to_string(), arg.to_string()];
        let capture = self.run_and_capture(&source, &args)?;
        expect_output(&Expectation::CleanRun, capture)
    }

    /// Stdout of a parse-only run of `code`.
    pub fn parse_output(&self, code: &str) -> HarnessResult<String> {
        Ok(self.run_parse_only(&self.text_source(code))?.output.stdout)
    }

    /// The runtime's parse result for `code`.
    pub fn parse_result(&self, code: &str) -> HarnessResult<R::Outcome> {
        Ok(self.run_parse_only(&self.text_source(code))?.outcome)
    }
}

fn fresh_context() -> ExecutionContext {
    ExecutionContext::new(RuntimeOptions::capturing())
}

fn load(path: &Path) -> HarnessResult<SourceUnit> {
    SourceUnit::from_file(path).map_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "script vanished after resolution");
        HarnessError::ResourceNotFound {
            script: path.display().to_string(),
            attempted: vec![path.to_path_buf()],
        }
    })
}

fn expect_output<T>(expectation: &Expectation, capture: RunCapture<T>) -> HarnessResult<T> {
    verify::check_output(expectation, &capture.output).map_err(mismatch)?;
    Ok(capture.outcome)
}

fn mismatch(m: verify::AssertionMismatch) -> HarnessError {
    tracing::debug!(strategy = %m.strategy, "verification failed");
    HarnessError::Mismatch(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CalcRuntime, MemoryProbe};
    use crate::verify::Strategy;

    fn harness() -> Harness<CalcRuntime> {
        Harness::with_probe(CalcRuntime::new(), &HarnessConfig::default(), MemoryProbe::new())
    }

    #[test]
    fn test_assert_prints_passes() {
        harness().assert_prints("2\n", "print(1+1)").unwrap();
    }

    #[test]
    fn test_assert_prints_mismatch() {
        let err = harness().assert_prints("3\n", "print(1+1)").unwrap_err();
        match err {
            HarnessError::Mismatch(m) => assert_eq!(m.strategy, Strategy::Exact),
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_is_repeatable() {
        let h = harness();
        let source = h.text_source("print(6*7)\nprint(\"x\")");
        let first = h.run_and_capture(&source, &[]).unwrap().output;
        let second = h.run_and_capture(&source, &[]).unwrap().output;
        assert_eq!(first, second);
        assert_eq!(first.stdout, "42\nx\n");
    }

    #[test]
    fn test_assert_print_contains() {
        harness().assert_print_contains("world", "print(\"hello world\")").unwrap();
        assert!(harness().assert_print_contains("moon", "print(\"hello world\")").is_err());
    }

    #[test]
    fn test_assert_error_matches_description() {
        harness()
            .assert_error("ZeroDivisionError: division by zero", "print(1/0)")
            .unwrap();
    }

    #[test]
    fn test_assert_error_wrong_description_fails() {
        let err = harness().assert_error("ValueError: nope", "print(1/0)").unwrap_err();
        match err {
            HarnessError::Mismatch(m) => {
                assert_eq!(m.actual, "ZeroDivisionError: division by zero");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_error_expecting_clean_run_is_no_error() {
        let h = harness();
        let outcome = h.run_expecting_error(&h.text_source("print(1)"), &[]);
        assert_eq!(outcome, ErrorOutcome::NoError);
        assert_eq!(outcome.to_string(), "no error!");
    }

    #[test]
    fn test_check_forwards_args_to_error_expecting_run() {
        let h = harness();
        let input = ScriptInput::Code("n = int(argv[1])".into());
        let args = ["bench.py".to_string(), "abc".to_string()];
        h.check(
            &Expectation::Error("ValueError: invalid literal for int() with base 10: 'abc'".into()),
            &input,
            &args,
        )
        .unwrap();
        h.check(&Expectation::NoError, &input, &["bench.py".into(), "7".into()]).unwrap();

        let outcome = h.run_expecting_error(&h.text_source("n = int(argv[1])"), &[]);
        assert_eq!(outcome, ErrorOutcome::Raised("IndexError: list index out of range".into()));
    }

    #[test]
    fn test_default_entry_point_does_not_raise_on_absorbed_failure() {
        let h = harness();
        let capture = h.run_and_capture(&h.text_source("print(1)\nprint(1/0)"), &[]).unwrap();
        assert_eq!(capture.output.stdout, "1\n");
        assert!(capture.output.stderr.ends_with("ZeroDivisionError: division by zero\n"));
    }

    #[test]
    fn test_missing_test_script_is_location_error() {
        let err = harness().assert_prints_script("", "foo.py").unwrap_err();
        assert!(matches!(err, HarnessError::Configuration { .. }));
    }

    #[test]
    fn test_parse_result_counts_statements() {
        let parsed = harness().parse_result("x = 1\nprint(x)\n").unwrap();
        assert_eq!(parsed.statements, 2);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_does_not_execute() {
        let output = harness().parse_output("print(1/0)").unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_check_dispatches_on_expectation() {
        let h = harness();
        let code = ScriptInput::Code("print(2)".to_string());
        h.check(&Expectation::Exact("2\n".to_string()), &code, &[]).unwrap();
        h.check(&Expectation::NoError, &code, &[]).unwrap();
        h.check(&Expectation::CleanRun, &code, &[]).unwrap();
        assert!(h.check(&Expectation::Error("E".to_string()), &code, &[]).is_err());
    }
}
