//! Harness configuration
//!
//! Where scripts live is configuration, not code: each logical root carries its own ordered base prefixes and
//! sub-root folders. The defaults describe a checkout with an `edu.uci.python.test` test project and a
//! `benchmarks` project, reachable either from one directory below the checkout (IDE runs) or from its parent
//! (build-tool runs).

use std::path::PathBuf;

/// Synthetic logical name given to inline source text.
pub const DEFAULT_SOURCE_NAME: &str = "(test)";

/// Logical root of the test scripts.
pub const DEFAULT_TESTS_ROOT: &str = "edu.uci.python.test/src/tests";

/// Logical root of the benchmark scripts.
pub const DEFAULT_BENCHMARKS_ROOT: &str = "benchmarks/src";

/// One environment-specific prefix tried in front of a logical root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePrefix {
    /// Human-readable name of the invocation environment (shown in logs)
    pub label: String,
    /// Path prepended to the logical root
    pub prefix: PathBuf,
}

impl BasePrefix {
    pub fn new(label: impl Into<String>, prefix: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
        }
    }
}

/// Layout of one logical root on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorLayout {
    /// Relative path of the root inside the project checkout
    pub logical_root: PathBuf,
    /// Candidate prefixes, in the order they are probed
    pub base_prefixes: Vec<BasePrefix>,
    /// Sub-folders probed under the chosen base; an empty path means the base itself
    pub sub_roots: Vec<PathBuf>,
}

impl LocatorLayout {
    /// Create a layout with the default prefixes and a single plain sub-root.
    pub fn new(logical_root: impl Into<PathBuf>) -> Self {
        Self {
            logical_root: logical_root.into(),
            base_prefixes: default_prefixes(),
            sub_roots: vec![PathBuf::new()],
        }
    }

    /// Layout of the test scripts.
    pub fn tests() -> Self {
        Self::new(DEFAULT_TESTS_ROOT)
    }

    /// Layout of the benchmark scripts: plain, then grouped, then micro.
    pub fn benchmarks() -> Self {
        Self::new(DEFAULT_BENCHMARKS_ROOT).with_sub_roots(["", "benchmarks", "micro"])
    }

    /// Replace the base prefixes
    pub fn with_base_prefixes(mut self, prefixes: impl IntoIterator<Item = BasePrefix>) -> Self {
        self.base_prefixes = prefixes.into_iter().collect();
        self
    }

    /// Replace the sub-roots
    pub fn with_sub_roots<P: Into<PathBuf>>(mut self, sub_roots: impl IntoIterator<Item = P>) -> Self {
        self.sub_roots = sub_roots.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the logical root, keeping prefixes and sub-roots
    pub fn with_logical_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.logical_root = root.into();
        self
    }
}

fn default_prefixes() -> Vec<BasePrefix> {
    vec![BasePrefix::new("ide", ".."), BasePrefix::new("mx", "zippy")]
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Logical name attached to inline source text
    pub source_name: String,
    /// Where test scripts are looked up
    pub tests: LocatorLayout,
    /// Where benchmark scripts are looked up
    pub benchmarks: LocatorLayout,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            source_name: DEFAULT_SOURCE_NAME.to_string(),
            tests: LocatorLayout::tests(),
            benchmarks: LocatorLayout::benchmarks(),
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name given to inline sources
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Set the tests layout
    pub fn with_tests(mut self, layout: LocatorLayout) -> Self {
        self.tests = layout;
        self
    }

    /// Set the benchmarks layout
    pub fn with_benchmarks(mut self, layout: LocatorLayout) -> Self {
        self.benchmarks = layout;
        self
    }
}
