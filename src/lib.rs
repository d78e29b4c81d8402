#![forbid(unsafe_code)]
//! Script execution harness
//!
//! Runs source text or script files through an interpreter with both output streams captured in memory, normalizes
//! the capture, and checks it against an expectation: exact stdout, stdout containment, a specific raised failure,
//! or a clean benchmark run. Scripts are found by probing an ordered list of base directories, so the same test
//! suite works whether it is started from an IDE or from a build tool.
//!
//! ## Layout
//!
//! - `harness_core` (separate crate): newline normalization, failure descriptions, the error-run outcome.
//! - [`locator`]: script-name to path resolution.
//! - [`harness`]: execution, capture and the assert-style entry points.
//! - [`verify`]: verification strategies.
//! - [`process`]: a runtime backed by an external interpreter executable.
//! - `testing` (feature `testing`): in-memory probe and a toy interpreter for tests.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod harness;
pub mod locator;
pub mod process;
pub mod runtime;
pub mod source;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod verify;
pub mod version;

pub use config::{HarnessConfig, LocatorLayout};
pub use context::{CapturedOutput, ExecutionContext, OutputSink, RuntimeOptions};
pub use errors::{HarnessError, HarnessResult};
pub use harness::{Harness, RunCapture, ScriptInput};
pub use harness_core::{ErrorOutcome, InterpreterFailure, NO_ERROR_SENTINEL, normalize_newlines};
pub use locator::ResourceLocator;
pub use process::ProcessRuntime;
pub use runtime::ScriptRuntime;
pub use source::SourceUnit;
pub use verify::{AssertionMismatch, Expectation, Strategy};
