use crate::error::{IncludeTreeError, Result};
use dtview_annotated::normalize_lexically;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of file contents for include resolution
pub trait SourceLoader {
    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Stable identity of a path, used to detect cycles
    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize_lexically(path, None)
    }
}

/// Loader backed by the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|source| IncludeTreeError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path, None))
    }
}

/// In-memory loader keyed by normalised path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a file
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .insert(normalize_lexically(path.as_ref(), None), contents.into());
    }
}

impl SourceLoader for MemoryLoader {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_lexically(path, None))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .get(&normalize_lexically(path, None))
            .cloned()
            .ok_or_else(|| IncludeTreeError::NotFound(path.display().to_string()))
    }
}
