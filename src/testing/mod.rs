//! Test doubles for the harness.
//!
//! - [`MemoryProbe`]: an in-memory file tree for exercising the locator without touching disk.
//! - [`CalcRuntime`]: a small line-oriented interpreter, enough to drive every harness entry point without an
//!   external interpreter installed.

mod calc;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::locator::Probe;

pub use calc::{CalcOutcome, CalcRuntime};

/// Probe answering from a fixed set of directories and files.
#[derive(Debug, Clone, Default)]
pub struct MemoryProbe {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and its ancestors.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.dirs.insert(path);
        self
    }

    /// Add a readable file and its ancestor directories.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path);
        self
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.dirs.insert(ancestor.to_path_buf());
            }
        }
    }
}

impl Probe for MemoryProbe {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn is_readable_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}
