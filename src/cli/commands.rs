//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::Path;

use serde_json::json;

use crate::config::HarnessConfig;
use crate::context::{ExecutionContext, OutputSink, RuntimeOptions};
use crate::errors::HarnessError;
use crate::harness::{Harness, ScriptInput};
use crate::locator::ResourceLocator;
use crate::process::ProcessRuntime;
use crate::runtime::ScriptRuntime;
use crate::verify::{AssertionMismatch, Expectation, Strategy};
use crate::version::HARNESS_VERSION;

use super::{CliError, CliResult, ExitCode, InputArgs};

// ============================================================================
// Argument conversion
// ============================================================================

/// The expectation selected by the `run` flags, if any. Clap keeps them mutually exclusive.
pub fn expectation_from(
    expect: Option<String>,
    contains: Option<String>,
    expect_error: Option<String>,
    no_error: bool,
    clean: bool,
) -> Option<Expectation> {
    expect
        .map(Expectation::Exact)
        .or_else(|| contains.map(Expectation::Contains))
        .or_else(|| expect_error.map(Expectation::Error))
        .or_else(|| no_error.then_some(Expectation::NoError))
        .or_else(|| clean.then_some(Expectation::CleanRun))
}

pub fn script_input(input: InputArgs) -> CliResult<ScriptInput> {
    match (input.code, input.file) {
        (Some(code), _) if code.is_empty() => Err(CliError::failure(
            "Error: -c/--command requires source code string",
        )),
        (Some(code), _) => Ok(ScriptInput::Code(code)),
        (None, Some(file)) => Ok(ScriptInput::File(file)),
        (None, None) => Err(CliError::failure("Error: requires a file path or -c \"code\"")),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Check `expectation` against one run of `input`.
pub fn check(
    runtime: ProcessRuntime,
    config: &HarnessConfig,
    expectation: &Expectation,
    input: &ScriptInput,
    args: &[String],
    json: bool,
) -> CliResult<ExitCode> {
    let harness = Harness::with_config(runtime, config);
    report(expectation.strategy(), harness.check(expectation, input, args), json)
}

/// Run a benchmark and check that it ran cleanly.
pub fn bench(runtime: ProcessRuntime, config: &HarnessConfig, script: &Path, arg: &str, json: bool) -> CliResult<ExitCode> {
    let harness = Harness::with_config(runtime, config);
    let result = harness.assert_bench_no_error(script, arg).map(|_| ());
    report(Strategy::CleanRun, result, json)
}

/// Run `input` with the child's streams forwarded to ours.
pub fn echo(runtime: ProcessRuntime, config: &HarnessConfig, input: &ScriptInput, args: &[String]) -> CliResult<ExitCode> {
    let harness = Harness::with_config(runtime, config);
    let source = harness.source_for(input)?;
    let mut ctx = ExecutionContext::new(
        RuntimeOptions::default()
            .with_standard_out(OutputSink::inherit_stdout())
            .with_standard_err(OutputSink::inherit_stderr()),
    );
    let outcome = harness
        .runtime()
        .run_script(args, &source, &mut ctx)
        .map_err(HarnessError::from)?;
    Ok(exit_code_of(outcome.success, outcome.exit_code))
}

/// Parse `input` without running it, printing whatever the parser reported.
pub fn parse(runtime: ProcessRuntime, config: &HarnessConfig, input: &ScriptInput) -> CliResult<ExitCode> {
    let harness = Harness::with_config(runtime, config);
    let source = harness.source_for(input)?;
    let capture = harness.run_parse_only(&source)?;
    print!("{}", capture.output.stdout);
    eprint!("{}", capture.output.stderr);
    Ok(exit_code_of(capture.outcome.success, capture.outcome.exit_code))
}

/// Print the file a script name resolves to.
pub fn locate(config: &HarnessConfig, name: &Path, bench: bool) -> CliResult<ExitCode> {
    let layout = if bench { &config.benchmarks } else { &config.tests };
    let path = ResourceLocator::on_disk(layout).locate(name)?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Reporting
// ============================================================================

fn exit_code_of(success: bool, code: Option<i32>) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode(code.filter(|c| *c != 0).unwrap_or(ExitCode::FAILURE.0))
    }
}

/// Turn a check result into output and an exit code.
///
/// With `json`, a verification failure is reported on stdout and exits 1 without an error message; location and
/// interpreter failures are errors either way.
fn report(strategy: Strategy, result: Result<(), HarnessError>, json: bool) -> CliResult<ExitCode> {
    match result {
        Ok(()) => {
            if json {
                println!("{}", verdict_json(strategy, None));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(HarnessError::Mismatch(mismatch)) if json => {
            println!("{}", verdict_json(strategy, Some(&mismatch)));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn verdict_json(strategy: Strategy, mismatch: Option<&AssertionMismatch>) -> serde_json::Value {
    match mismatch {
        None => json!({
            "status": "pass",
            "strategy": strategy.to_string(),
            "version": HARNESS_VERSION,
        }),
        Some(m) => json!({
            "status": "fail",
            "strategy": m.strategy.to_string(),
            "expected": m.expected,
            "actual": m.actual,
            "stderr": m.stderr,
            "version": HARNESS_VERSION,
        }),
    }
}
