//! Provide the pure helpers and failure vocabulary shared by the script harness and the runtimes it drives.
//!
//! This crate is intentionally small and dependency-light. It contains deterministic helpers that both:
//! - the harness uses to decode and normalize captured output before comparing it, and
//! - runtime adapters use to describe an interpreter-level failure in one canonical shape.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state, and no harness-specific types.
//! - Current scope: line-ending normalization, lossy capture decoding, `InterpreterFailure`, and the tagged
//!   `ErrorOutcome` produced by error-expecting runs.

pub mod failure;
pub mod text;

pub use failure::{ErrorOutcome, InterpreterFailure, NO_ERROR_SENTINEL};
pub use text::{decode_captured, normalize_newlines};
