//! Resource locator
//!
//! Maps a script name to a file on disk, tolerating the different working directories a test run can start
//! from. Resolution is a one-shot, order-sensitive probe:
//!
//! 1. Each [`BaseResolver`] proposes a base directory for the logical root; the first one that exists wins.
//! 2. Each sub-root under that base is tried in order; the first readable file wins.
//!
//! Nothing is cached between calls, and the returned path is only guaranteed to exist at resolution time.

pub mod probe;
pub mod resolver;

use std::path::{Path, PathBuf};

use crate::config::LocatorLayout;
use crate::errors::{HarnessError, HarnessResult};

pub use probe::{Probe, RealFs};
pub use resolver::{BaseResolver, FixedResolver, PrefixResolver};

use resolver::join_non_empty;

/// One (base directory, sub-root) pair considered while locating a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionCandidate {
    pub base: PathBuf,
    pub sub_root: PathBuf,
}

impl ResolutionCandidate {
    /// Full path of `script` under this candidate.
    pub fn path_for(&self, script: &Path) -> PathBuf {
        join_non_empty(&join_non_empty(&self.base, &self.sub_root), script)
    }
}

/// Locates scripts under one logical root.
pub struct ResourceLocator {
    logical_root: PathBuf,
    resolvers: Vec<Box<dyn BaseResolver>>,
    sub_roots: Vec<PathBuf>,
    probe: Box<dyn Probe>,
}

impl ResourceLocator {
    pub fn new(
        logical_root: impl Into<PathBuf>,
        resolvers: Vec<Box<dyn BaseResolver>>,
        sub_roots: Vec<PathBuf>,
        probe: Box<dyn Probe>,
    ) -> Self {
        Self {
            logical_root: logical_root.into(),
            resolvers,
            sub_roots,
            probe,
        }
    }

    /// Build a locator from a layout, probing with `probe`.
    pub fn from_layout(layout: &LocatorLayout, probe: impl Probe + 'static) -> Self {
        let resolvers = layout
            .base_prefixes
            .iter()
            .map(|base| Box::new(PrefixResolver::from(base)) as Box<dyn BaseResolver>)
            .collect();
        Self::new(layout.logical_root.clone(), resolvers, layout.sub_roots.clone(), Box::new(probe))
    }

    /// Build a locator from a layout, probing the real file system.
    pub fn on_disk(layout: &LocatorLayout) -> Self {
        Self::from_layout(layout, RealFs)
    }

    pub fn logical_root(&self) -> &Path {
        &self.logical_root
    }

    pub fn sub_roots(&self) -> &[PathBuf] {
        &self.sub_roots
    }

    /// The first candidate base directory that exists.
    ///
    /// ## Errors
    /// - `HarnessError::Configuration` when no candidate exists.
    pub fn base_dir(&self) -> HarnessResult<PathBuf> {
        let mut tried = Vec::with_capacity(self.resolvers.len());
        for resolver in &self.resolvers {
            let candidate = resolver.candidate(&self.logical_root);
            let exists = self.probe.is_dir(&candidate);
            tracing::debug!(
                env = resolver.label(),
                candidate = %candidate.display(),
                exists,
                "probing base directory"
            );
            if exists {
                return Ok(candidate);
            }
            tried.push(candidate);
        }
        Err(HarnessError::Configuration {
            root: self.logical_root.display().to_string(),
            tried,
        })
    }

    /// Candidates for `base`, in probing order.
    pub fn candidates(&self, base: &Path) -> Vec<ResolutionCandidate> {
        self.sub_roots
            .iter()
            .map(|sub_root| ResolutionCandidate {
                base: base.to_path_buf(),
                sub_root: sub_root.clone(),
            })
            .collect()
    }

    /// Resolve `script` to a readable file.
    ///
    /// ## Errors
    /// - `HarnessError::Configuration` when no base directory exists.
    /// - `HarnessError::ResourceNotFound` naming every attempted path when no sub-root holds the file.
    pub fn locate(&self, script: impl AsRef<Path>) -> HarnessResult<PathBuf> {
        let script = script.as_ref();
        let base = self.base_dir()?;

        let mut attempted = Vec::with_capacity(self.sub_roots.len());
        for candidate in self.candidates(&base) {
            let path = candidate.path_for(script);
            let readable = self.probe.is_readable_file(&path);
            tracing::debug!(path = %path.display(), readable, "probing script");
            if readable {
                return Ok(path);
            }
            attempted.push(path);
        }
        Err(HarnessError::ResourceNotFound {
            script: script.display().to_string(),
            attempted,
        })
    }
}

impl std::fmt::Debug for ResourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.resolvers.iter().map(|r| r.label()).collect();
        f.debug_struct("ResourceLocator")
            .field("logical_root", &self.logical_root)
            .field("resolvers", &labels)
            .field("sub_roots", &self.sub_roots)
            .finish()
    }
}
