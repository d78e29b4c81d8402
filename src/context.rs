//! Execution contexts and their output sinks.
//!
//! An [`ExecutionContext`] is built fresh for every harness invocation and consumed when its capture is read,
//! so nothing written by one run can be observed by another.

use std::collections::BTreeMap;
use std::io::{self, Write};

use harness_core::decode_captured;

/// Destination for one of a program's output streams.
#[derive(Debug)]
pub enum OutputSink {
    /// Collect bytes in memory.
    Buffer(Vec<u8>),
    /// Forward to the process's real stdout.
    Stdout,
    /// Forward to the process's real stderr.
    Stderr,
    /// Drop everything.
    Discard,
}

impl Default for OutputSink {
    fn default() -> Self {
        OutputSink::Buffer(Vec::new())
    }
}

impl OutputSink {
    pub fn buffer() -> Self {
        OutputSink::Buffer(Vec::new())
    }

    pub fn inherit_stdout() -> Self {
        OutputSink::Stdout
    }

    pub fn inherit_stderr() -> Self {
        OutputSink::Stderr
    }

    pub fn discard() -> Self {
        OutputSink::Discard
    }

    /// Bytes collected so far; empty for non-buffer sinks.
    pub fn captured(&self) -> &[u8] {
        match self {
            OutputSink::Buffer(bytes) => bytes,
            _ => &[],
        }
    }

    fn into_captured(self) -> Vec<u8> {
        match self {
            OutputSink::Buffer(bytes) => bytes,
            _ => Vec::new(),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Buffer(bytes) => bytes.write(buf),
            OutputSink::Stdout => io::stdout().write(buf),
            OutputSink::Stderr => io::stderr().write(buf),
            OutputSink::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Stdout => io::stdout().flush(),
            OutputSink::Stderr => io::stderr().flush(),
            OutputSink::Buffer(_) | OutputSink::Discard => Ok(()),
        }
    }
}

/// Options a runtime is configured with.
#[derive(Debug, Default)]
pub struct RuntimeOptions {
    /// Destination for the program's normal output
    pub standard_out: OutputSink,
    /// Destination for the program's diagnostic output
    pub standard_err: OutputSink,
    /// Interpreter-specific settings, passed through untouched
    pub settings: BTreeMap<String, String>,
}

impl RuntimeOptions {
    /// Options with both streams captured in memory.
    pub fn capturing() -> Self {
        Self {
            standard_out: OutputSink::buffer(),
            standard_err: OutputSink::buffer(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_standard_out(mut self, sink: OutputSink) -> Self {
        self.standard_out = sink;
        self
    }

    pub fn with_standard_err(mut self, sink: OutputSink) -> Self {
        self.standard_err = sink;
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

/// Single-use configuration bundle for one run.
#[derive(Debug)]
pub struct ExecutionContext {
    options: RuntimeOptions,
}

impl ExecutionContext {
    pub fn new(options: RuntimeOptions) -> Self {
        Self { options }
    }

    /// A context that captures both streams in memory.
    pub fn capturing() -> Self {
        Self::new(RuntimeOptions::capturing())
    }

    /// A context whose output goes nowhere, for runs whose result is all that matters.
    pub fn detached(options: RuntimeOptions) -> Self {
        Self::new(
            options
                .with_standard_out(OutputSink::discard())
                .with_standard_err(OutputSink::discard()),
        )
    }

    pub fn stdout(&mut self) -> &mut OutputSink {
        &mut self.options.standard_out
    }

    pub fn stderr(&mut self) -> &mut OutputSink {
        &mut self.options.standard_err
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.options.settings.get(key).map(String::as_str)
    }

    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.options.settings
    }

    /// Consume the context and decode what its sinks collected.
    pub fn into_captured(self) -> CapturedOutput {
        let RuntimeOptions {
            standard_out,
            standard_err,
            ..
        } = self.options;
        CapturedOutput {
            stdout: decode_captured(&standard_out.into_captured()),
            stderr: decode_captured(&standard_err.into_captured()),
        }
    }
}

/// Decoded, newline-normalized text a run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capturing_context_collects_both_streams() {
        let mut ctx = ExecutionContext::capturing();
        write!(ctx.stdout(), "out\r\n").unwrap();
        write!(ctx.stderr(), "err\n").unwrap();

        let captured = ctx.into_captured();
        assert_eq!(captured.stdout, "out\n");
        assert_eq!(captured.stderr, "err\n");
    }

    #[test]
    fn test_detached_context_captures_nothing() {
        let mut ctx = ExecutionContext::detached(RuntimeOptions::capturing());
        ctx.stdout().write_all(b"ignored").unwrap();
        assert_eq!(ctx.into_captured(), CapturedOutput::default());
    }

    #[test]
    fn test_settings_pass_through() {
        let ctx = ExecutionContext::new(RuntimeOptions::capturing().with_setting("PYTHONHASHSEED", "0"));
        assert_eq!(ctx.setting("PYTHONHASHSEED"), Some("0"));
        assert_eq!(ctx.setting("missing"), None);
    }

    #[test]
    fn test_buffer_sink_reports_captured_bytes() {
        let mut sink = OutputSink::buffer();
        sink.write_all(b"abc").unwrap();
        assert_eq!(sink.captured(), b"abc");
        assert!(OutputSink::discard().captured().is_empty());
    }

    #[test]
    fn test_contexts_do_not_share_buffers() {
        let mut first = ExecutionContext::capturing();
        let second = ExecutionContext::capturing();
        first.stdout().write_all(b"only here").unwrap();
        assert_eq!(first.into_captured().stdout, "only here");
        assert_eq!(second.into_captured().stdout, "");
    }
}
