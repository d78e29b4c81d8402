//! File-system probing.
//!
//! The locator never reads or mutates what it probes; it only asks two questions. Keeping them behind a trait
//! lets resolution run against an in-memory tree (see `testing::MemoryProbe`, behind the `testing` feature).

use std::fs::File;
use std::path::Path;

/// Read-only existence checks used during resolution.
pub trait Probe: Send + Sync {
    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether `path` is a regular file that can be opened for reading.
    fn is_readable_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl Probe for RealFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_readable_file(&self, path: &Path) -> bool {
        File::open(path)
            .and_then(|f| f.metadata())
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
