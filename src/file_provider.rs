//! File provider abstraction
//!
//! Detectors and the hotspot index receive a `FileProvider` that supplies the
//! classified file list and cached content, instead of reading the disk
//! themselves. Tests substitute [`MockFileProvider`].

use crate::cache::FileCache;
use crate::models::SourceFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source files and their contents.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// rayon's parallel detector execution.
pub trait FileProvider: Send + Sync {
    /// All scanned files, sorted by path.
    fn files(&self) -> &[SourceFile];

    /// Read (or return cached) file content. Unreadable files are empty.
    fn content(&self, path: &Path) -> Arc<String>;

    /// Read (or return cached) file lines.
    fn lines(&self, path: &Path) -> Arc<Vec<String>>;

    /// The audited root.
    fn repo_path(&self) -> &Path;

    /// Only the `.cs` files.
    fn csharp_files(&self) -> Vec<&SourceFile> {
        self.files().iter().filter(|f| f.is_csharp()).collect()
    }
}

/// Real implementation backed by a [`FileCache`].
pub struct SourceFiles {
    files: Vec<SourceFile>,
    repo_path: PathBuf,
    cache: FileCache,
}

impl SourceFiles {
    /// Create a provider from an already-classified file list.
    pub fn new(files: Vec<SourceFile>, repo_path: PathBuf, cache: FileCache) -> Self {
        Self {
            files,
            repo_path,
            cache,
        }
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files
    }
}

impl FileProvider for SourceFiles {
    fn files(&self) -> &[SourceFile] {
        &self.files
    }

    fn content(&self, path: &Path) -> Arc<String> {
        self.cache.content(path)
    }

    fn lines(&self, path: &Path) -> Arc<Vec<String>> {
        self.cache.lines(path)
    }

    fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

// ---------------------------------------------------------------------------
// Test-only mock
// ---------------------------------------------------------------------------

#[cfg(test)]
pub struct MockFileProvider {
    files: Vec<SourceFile>,
    cache: FileCache,
    repo_path: PathBuf,
}

#[cfg(test)]
impl MockFileProvider {
    /// Build a mock from `(relative_path, content)` pairs.
    ///
    /// Paths are prefixed with `/mock/repo/` so tests never touch real files.
    /// Every file is run through the classifier, as the pipeline would.
    pub fn new(entries: Vec<(&str, &str)>) -> Self {
        let repo_path = PathBuf::from("/mock/repo");
        let cache = FileCache::new();
        let mut files = Vec::with_capacity(entries.len());

        for (rel, body) in entries {
            let full = repo_path.join(rel);
            cache.insert(full.clone(), body);
            let mut file = SourceFile::new(full, rel, body.lines().count());
            crate::classifier::classify(&mut file, body);
            files.push(file);
        }

        Self {
            files,
            cache,
            repo_path,
        }
    }
}

#[cfg(test)]
impl FileProvider for MockFileProvider {
    fn files(&self) -> &[SourceFile] {
        &self.files
    }

    fn content(&self, path: &Path) -> Arc<String> {
        self.cache.content(path)
    }

    fn lines(&self, path: &Path) -> Arc<Vec<String>> {
        self.cache.lines(path)
    }

    fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}
