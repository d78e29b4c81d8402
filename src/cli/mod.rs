//! CLI module for the script harness
//!
//! ## Commands
//!
//! - `run [FILE] [-c CODE]` - Run a script, echoing its streams or checking an expectation
//! - `bench SCRIPT ARG` - Run a benchmark script and check it ran cleanly
//! - `parse [FILE] [-c CODE]` - Parse without executing
//! - `locate NAME [--bench]` - Print where a script name resolves to
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_BENCHMARKS_ROOT, DEFAULT_SOURCE_NAME, DEFAULT_TESTS_ROOT, HarnessConfig, LocatorLayout};
use crate::errors::HarnessError;
use crate::process::{DEFAULT_INTERPRETER, DEFAULT_STDIN_ARG, ProcessRuntime};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// A check did not hold or the interpreter failed.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// A script or root directory could not be located.
    pub const NOT_FOUND: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        let exit_code = if err.is_location_error() {
            ExitCode::NOT_FOUND
        } else {
            ExitCode::FAILURE
        };
        let report = miette::Report::new(err);
        Self::new(format!("{report:?}"), exit_code)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = crate::version::HARNESS_VERSION;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run scripts through an interpreter with captured output and check the result
#[derive(Parser, Debug)]
#[command(name = "script-harness")]
#[command(version = VERSION)]
#[command(about = "Run scripts through an interpreter with captured output and check the result", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Interpreter executable
    #[arg(long, global = true, value_name = "PROGRAM", default_value = DEFAULT_INTERPRETER)]
    pub interpreter: String,

    /// Argument telling the interpreter to read the program from stdin (repeatable)
    #[arg(long = "stdin-arg", global = true, value_name = "ARG", allow_hyphen_values = true)]
    pub stdin_args: Vec<String>,

    /// Logical root of test scripts
    #[arg(long = "tests-root", global = true, value_name = "DIR", default_value = DEFAULT_TESTS_ROOT)]
    pub tests_root: PathBuf,

    /// Logical root of benchmark scripts
    #[arg(long = "bench-root", global = true, value_name = "DIR", default_value = DEFAULT_BENCHMARKS_ROOT)]
    pub bench_root: PathBuf,

    /// Name inline code is reported under
    #[arg(long = "source-name", global = true, value_name = "NAME", default_value = DEFAULT_SOURCE_NAME)]
    pub source_name: String,
}

impl GlobalArgs {
    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig::new()
            .with_source_name(self.source_name.clone())
            .with_tests(LocatorLayout::tests().with_logical_root(self.tests_root.clone()))
            .with_benchmarks(LocatorLayout::benchmarks().with_logical_root(self.bench_root.clone()))
    }

    pub fn runtime(&self) -> ProcessRuntime {
        let runtime = ProcessRuntime::new(self.interpreter.clone());
        if self.stdin_args.is_empty() {
            runtime.with_stdin_args([DEFAULT_STDIN_ARG])
        } else {
            runtime.with_stdin_args(self.stdin_args.clone())
        }
    }
}

/// Where a `run` or `parse` takes its program from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Script file
    #[arg(value_name = "FILE", conflicts_with = "code")]
    pub file: Option<PathBuf>,

    /// Inline source code
    #[arg(short = 'c', long = "command", value_name = "CODE")]
    pub code: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a script; without an expectation its output is echoed
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Stdout must equal TEXT
        #[arg(long, value_name = "TEXT", group = "expectation")]
        expect: Option<String>,

        /// Stdout must contain TEXT
        #[arg(long, value_name = "TEXT", group = "expectation")]
        contains: Option<String>,

        /// The run must raise a failure described exactly as DESCRIPTION
        #[arg(long = "expect-error", value_name = "DESCRIPTION", group = "expectation")]
        expect_error: Option<String>,

        /// The run must not raise
        #[arg(long = "no-error", group = "expectation")]
        no_error: bool,

        /// Stderr must be empty and stdout must not be
        #[arg(long = "clean", group = "expectation")]
        clean: bool,

        /// Report the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Arguments passed to the script
        #[arg(last = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Run a benchmark script with `[SCRIPT, ARG]` and check it ran cleanly
    Bench {
        /// Benchmark script name, resolved under the benchmarks root
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Argument handed to the benchmark
        #[arg(value_name = "ARG", allow_hyphen_values = true)]
        arg: String,
        /// Report the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a script without executing it
    Parse {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the path a script name resolves to
    Locate {
        /// Script name
        #[arg(value_name = "NAME")]
        name: PathBuf,
        /// Resolve under the benchmarks root instead of the tests root
        #[arg(long)]
        bench: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.global.harness_config();
    let runtime = cli.global.runtime();

    match cli.command {
        Command::Run {
            input,
            expect,
            contains,
            expect_error,
            no_error,
            clean,
            json,
            args,
        } => {
            let expectation = commands::expectation_from(expect, contains, expect_error, no_error, clean);
            let input = commands::script_input(input)?;
            match expectation {
                Some(expectation) => commands::check(runtime, &config, &expectation, &input, &args, json),
                None => commands::echo(runtime, &config, &input, &args),
            }
        }
        Command::Bench { script, arg, json } => commands::bench(runtime, &config, &script, &arg, json),
        Command::Parse { input } => {
            let input = commands::script_input(input)?;
            commands::parse(runtime, &config, &input)
        }
        Command::Locate { name, bench } => commands::locate(&config, &name, bench),
    }
}

// ============================================================================
// Tests
// ============================================================================
