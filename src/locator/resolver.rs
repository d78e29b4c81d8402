//! Base-directory resolution strategies.
//!
//! Each resolver turns a logical root into one candidate base directory. Candidates are pure computations over
//! relative path fragments; whether a candidate exists is the locator's question, not the resolver's.

use std::path::{Path, PathBuf};

use crate::config::BasePrefix;

/// One way of finding the base directory of a logical root.
pub trait BaseResolver: Send + Sync {
    /// Name of the invocation environment this resolver stands for.
    fn label(&self) -> &str;

    /// Candidate base directory for `logical_root`.
    fn candidate(&self, logical_root: &Path) -> PathBuf;
}

/// Prepends a fixed prefix to the logical root (`..` for IDE runs, the project folder for build-tool runs).
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    label: String,
    prefix: PathBuf,
}

impl PrefixResolver {
    pub fn new(label: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
        }
    }
}

impl From<&BasePrefix> for PrefixResolver {
    fn from(base: &BasePrefix) -> Self {
        Self::new(base.label.clone(), base.prefix.clone())
    }
}

impl BaseResolver for PrefixResolver {
    fn label(&self) -> &str {
        &self.label
    }

    fn candidate(&self, logical_root: &Path) -> PathBuf {
        join_non_empty(&self.prefix, logical_root)
    }
}

/// Ignores the logical root and always proposes the same directory.
#[derive(Debug, Clone)]
pub struct FixedResolver {
    path: PathBuf,
}

impl FixedResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BaseResolver for FixedResolver {
    fn label(&self) -> &str {
        "fixed"
    }

    fn candidate(&self, _logical_root: &Path) -> PathBuf {
        self.path.clone()
    }
}

/// `base.join(rest)`, except an empty `rest` leaves `base` untouched (no trailing separator).
pub(crate) fn join_non_empty(base: &Path, rest: &Path) -> PathBuf {
    if rest.as_os_str().is_empty() {
        base.to_path_buf()
    } else if base.as_os_str().is_empty() {
        rest.to_path_buf()
    } else {
        base.join(rest)
    }
}
