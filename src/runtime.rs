//! The runtime contract the harness drives.
//!
//! A runtime owns its parser and builtins; the harness only hands it a source unit, an argument list and a
//! freshly built [`ExecutionContext`]. All program output must go to the context's sinks.

use std::fmt;

use harness_core::InterpreterFailure;

use crate::context::ExecutionContext;
use crate::source::SourceUnit;

/// An interpreter the harness can run scripts through.
pub trait ScriptRuntime {
    /// Structured parse/run result handed back to the caller for further assertions.
    type Outcome: fmt::Debug;

    /// Run a script.
    ///
    /// A runtime may report a script-level failure the way its console would (a traceback on the context's
    /// stderr) and still return `Ok`; an `Err` here is a failure the harness propagates to the caller.
    fn run_script(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<Self::Outcome, InterpreterFailure>;

    /// Run a script, returning every interpreter-level failure as `Err` instead of absorbing it.
    fn run_script_surfacing(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<Self::Outcome, InterpreterFailure>;

    /// Parse without executing. Parse-phase diagnostics may be written to the context's sinks.
    fn parse_only(&self, ctx: &mut ExecutionContext, source: &SourceUnit) -> Result<Self::Outcome, InterpreterFailure>;
}

impl<R: ScriptRuntime + ?Sized> ScriptRuntime for &R {
    type Outcome = R::Outcome;

    fn run_script(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<Self::Outcome, InterpreterFailure> {
        (**self).run_script(args, source, ctx)
    }

    fn run_script_surfacing(
        &self,
        args: &[String],
        source: &SourceUnit,
        ctx: &mut ExecutionContext,
    ) -> Result<Self::Outcome, InterpreterFailure> {
        (**self).run_script_surfacing(args, source, ctx)
    }

    fn parse_only(&self, ctx: &mut ExecutionContext, source: &SourceUnit) -> Result<Self::Outcome, InterpreterFailure> {
        (**self).parse_only(ctx, source)
    }
}
