//! External interpreter runtime
//!
//! [`ProcessRuntime`] runs each script in a child process with piped stdio and copies whatever the child wrote
//! into the context's sinks. Inline text is fed on stdin behind the configured stdin marker (`python3 - ARGS`);
//! file sources are passed by path (`python3 PATH ARGS`). Context settings become environment variables of the
//! child.
//!
//! A non-zero exit is absorbed by [`ScriptRuntime::run_script`] (the traceback stays on stderr, as on a console)
//! and surfaced by [`ScriptRuntime::run_script_surfacing`], which classifies the last non-empty stderr line.

use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

use harness_core::InterpreterFailure;

use crate::context::ExecutionContext;
use crate::runtime::ScriptRuntime;
use crate::source::SourceUnit;

/// Interpreter used when none is configured.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Marker argument telling the interpreter to read the program from stdin.
pub const DEFAULT_STDIN_ARG: &str = "-";

/// Arguments for a syntax-only check of a program read from stdin.
pub const DEFAULT_PARSE_ARGS: [&str; 2] = ["-c", "import ast, sys; ast.parse(sys.stdin.read())"];

/// How a child process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            exit_code: status.code(),
            success: status.success(),
        }
    }
}

/// [`ScriptRuntime`] backed by an external interpreter executable.
#[derive(Debug, Clone)]
pub struct ProcessRuntime {
    program: String,
    stdin_args: Vec<String>,
    parse_args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl Default for ProcessRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_INTERPRETER)
    }
}

impl ProcessRuntime {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            stdin_args: vec![DEFAULT_STDIN_ARG.to_string()],
            parse_args: DEFAULT_PARSE_ARGS.iter().map(|a| a.to_string()).collect(),
            env: BTreeMap::new(),
        }
    }

    /// Arguments placed before the script arguments when the program comes from stdin.
    pub fn with_stdin_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stdin_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Full argument list of a parse-only run; the program is fed on stdin.
    pub fn with_parse_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn stdin_args(&self) -> &[String] {
        &self.stdin_args
    }

    /// Build the command for `source`, returning it with the bytes to feed on stdin.
    fn command_for(&self, source: &SourceUnit, args: &[String], ctx: &ExecutionContext) -> (Command, Option<Vec<u8>>) {
        let mut cmd = Command::new(&self.program);
        let stdin = match source.path() {
            Some(path) => {
                cmd.arg(path);
                None
            }
            None => {
                cmd.args(&self.stdin_args);
                Some(source.code().as_bytes().to_vec())
            }
        };
        cmd.args(args);
        cmd.envs(&self.env).envs(ctx.settings());
        (cmd, stdin)
    }

    /// Spawn, feed stdin, wait, and copy both streams into the context.
    #[tracing::instrument(skip_all, fields(program = %self.program))]
    fn execute(
        &self,
        mut cmd: Command,
        stdin: Option<Vec<u8>>,
        ctx: &mut ExecutionContext,
    ) -> Result<(ProcessOutcome, String), InterpreterFailure> {
        cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| InterpreterFailure::new("SpawnError", format!("failed to start {}: {e}", self.program)))?;

        // Feed stdin from its own thread so a chatty child cannot block on a full stdout pipe.
        let feeder = match (child.stdin.take(), stdin) {
            (Some(mut pipe), Some(bytes)) => Some(thread::spawn(move || pipe.write_all(&bytes))),
            _ => None,
        };

        let Output { status, stdout, stderr } = child
            .wait_with_output()
            .map_err(|e| InterpreterFailure::new("OSError", format!("waiting for {}: {e}", self.program)))?;

        if let Some(feeder) = feeder {
            match feeder.join() {
                Ok(Ok(())) => {}
                // The child may exit before reading all of its program; its exit status tells the story.
                Ok(Err(e)) => tracing::debug!(error = %e, "stdin closed early"),
                Err(_) => return Err(InterpreterFailure::new("OSError", "stdin writer panicked")),
            }
        }

        ctx.stdout().write_all(&stdout).map_err(sink_failure)?;
        ctx.stderr().write_all(&stderr).map_err(sink_failure)?;

        let outcome = ProcessOutcome::from(status);
        tracing::debug!(exit_code = ?outcome.exit_code, stdout_len = stdout.len(), stderr_len = stderr.len(), "interpreter exited");
        Ok((outcome, String::from_utf8_lossy(&stderr).into_owned()))
    }
}

fn sink_failure(e: std::io::Error) -> InterpreterFailure {
    InterpreterFailure::new("OSError", format!("writing captured output: {e}"))
}

/// Classify a failed run from the last non-empty stderr line.
fn failure_from(outcome: ProcessOutcome, stderr: &str) -> InterpreterFailure {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .and_then(InterpreterFailure::from_description)
        .unwrap_or_else(|| match outcome.exit_code {
            Some(code) => InterpreterFailure::new("ProcessExit", format!("exit status {code}")),
            None => InterpreterFailure::new("ProcessExit", "terminated by signal"),
        })
}

impl ScriptRuntime for ProcessRuntime {
    type Outcome = ProcessOutcome;

    fn run_script(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<ProcessOutcome, InterpreterFailure> {
        let (cmd, stdin) = self.command_for(source, args, ctx);
        let (outcome, _) = self.execute(cmd, stdin, ctx)?;
        Ok(outcome)
    }

    fn run_script_surfacing(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<ProcessOutcome, InterpreterFailure> {
        let (cmd, stdin) = self.command_for(source, args, ctx);
        let (outcome, stderr) = self.execute(cmd, stdin, ctx)?;
        if outcome.success {
            Ok(outcome)
        } else {
            Err(failure_from(outcome, &stderr))
        }
    }

    fn parse_only(&self, ctx: &mut ExecutionContext, source: &SourceUnit) -> Result<ProcessOutcome, InterpreterFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.parse_args).envs(&self.env).envs(ctx.settings());
        let (outcome, _) = self.execute(cmd, Some(source.code().as_bytes().to_vec()), ctx)?;
        Ok(outcome)
    }
}
