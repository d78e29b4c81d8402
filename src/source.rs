//! Source units handed to a runtime.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One unit of source code: inline text with a synthetic name, or a file on disk.
///
/// Immutable once built. File units carry their contents, read at construction, so a runtime never has to
/// touch the file system to obtain the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUnit {
    Text { name: String, code: String },
    File { path: PathBuf, code: String },
}

impl SourceUnit {
    pub fn from_text(code: impl Into<String>, name: impl Into<String>) -> Self {
        SourceUnit::Text {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Read a file into a source unit.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let code = fs::read_to_string(path)?;
        Ok(SourceUnit::File {
            path: path.to_path_buf(),
            code,
        })
    }

    /// Logical name: the synthetic name for text, the path for files.
    pub fn name(&self) -> String {
        match self {
            SourceUnit::Text { name, .. } => name.clone(),
            SourceUnit::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            SourceUnit::Text { code, .. } | SourceUnit::File { code, .. } => code,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceUnit::Text { .. } => None,
            SourceUnit::File { path, .. } => Some(path),
        }
    }
}
