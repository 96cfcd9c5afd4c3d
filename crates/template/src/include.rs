//! Include sources
//!
//! Places the template engine reads included files from. Paths handed to a
//! source are already normalized: `/`-separated, no `.` or `..` components.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// A read-only tree of shader files
pub trait IncludeSource: Send + Sync {
    /// Reads the file at `path`
    ///
    /// Returns `Ok(None)` when this source has no such file, so the next
    /// source can be tried.
    fn read(&self, path: &str) -> io::Result<Option<String>>;
}

/// Files below a directory on disk; `/a/b.glsl` maps to `<root>/a/b.glsl`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl IncludeSource for DirectorySource {
    fn read(&self, path: &str) -> io::Result<Option<String>> {
        let file_path = self.root.join(path.trim_start_matches('/'));
        match std::fs::read_to_string(&file_path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Files held in memory, keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file; the path is normalized the same way include names are
    pub fn insert(&mut self, path: &str, text: impl Into<String>) -> &mut Self {
        let key = crate::template::normalize_path(path).unwrap_or_else(|| path.to_string());
        self.files.insert(key, text.into());
        self
    }

    pub fn with_file(mut self, path: &str, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl IncludeSource for MemorySource {
    fn read(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }
}
