//! File caching for the audit pipeline
//!
//! The scanner, classifier, detectors, hotspot index and reporters all read
//! the same files. `FileCache` reads each file once and hands out shared
//! `Arc` handles.
//!
//! Reads are best-effort: invalid UTF-8 is replaced rather than rejected,
//! and an unreadable file is cached as empty text so it contributes nothing
//! downstream instead of failing the audit.

use dashmap::DashMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Thread-safe file content cache
#[derive(Clone)]
pub struct FileCache {
    /// Cached file contents: path -> content
    contents: Arc<DashMap<PathBuf, Arc<String>>>,
    /// Cached file lines: path -> lines
    lines: Arc<DashMap<PathBuf, Arc<Vec<String>>>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(DashMap::new()),
            lines: Arc::new(DashMap::new()),
        }
    }

    /// Pre-warm the cache for a known file list
    pub fn warm(&self, paths: &[PathBuf]) {
        paths.par_iter().for_each(|path| {
            self.content(path);
        });
    }

    /// Get file content (cached). Unreadable files yield empty text.
    pub fn content(&self, path: &Path) -> Arc<String> {
        if let Some(content) = self.contents.get(path) {
            return Arc::clone(&content);
        }

        let arc = Arc::new(read_text(path));
        self.contents.insert(path.to_path_buf(), Arc::clone(&arc));
        arc
    }

    /// Get file lines (cached)
    pub fn lines(&self, path: &Path) -> Arc<Vec<String>> {
        if let Some(lines) = self.lines.get(path) {
            return Arc::clone(&lines);
        }

        let content = self.content(path);
        let lines: Vec<String> = content.lines().map(String::from).collect();
        let arc = Arc::new(lines);
        self.lines.insert(path.to_path_buf(), Arc::clone(&arc));
        arc
    }

    /// Seed the cache with in-memory content (used by tests and tooling)
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        self.lines.remove(&path);
        self.contents.insert(path, Arc::new(content.into()));
    }

    /// Cache stats
    pub fn stats(&self) -> (usize, usize) {
        (self.contents.len(), self.lines.len())
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

fn read_text(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => decode_dropping_invalid(e.as_bytes()),
        },
        Err(e) => {
            debug!("Unreadable file {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Decode UTF-8, silently dropping invalid byte sequences
fn decode_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // `valid` is a checked prefix
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    None => return out,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let cache = FileCache::new();
        let content = cache.content(Path::new("/definitely/not/here.cs"));
        assert!(content.is_empty());
        assert!(cache.lines(Path::new("/definitely/not/here.cs")).is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Latin1.cs");
        std::fs::write(&path, b"class Caf\xe9 { var s = \"SELECT \xff\xfe* FROM T\"; }\xf0\x9f").expect("write");

        let cache = FileCache::new();
        let content = cache.content(&path);
        assert_eq!(content.as_str(), "class Caf { var s = \"SELECT * FROM T\"; }");
        assert!(!content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_decode_keeps_valid_multibyte() {
        assert_eq!(decode_dropping_invalid("café ✓".as_bytes()), "café ✓");
        assert_eq!(decode_dropping_invalid(b"a\x80b\xc3"), "ab");
    }

    #[test]
    fn test_insert_and_lines() {
        let cache = FileCache::new();
        cache.insert("/mock/A.cs", "line one\nline two");
        assert_eq!(cache.lines(Path::new("/mock/A.cs")).len(), 2);
        cache.insert("/mock/A.cs", "only line");
        assert_eq!(cache.lines(Path::new("/mock/A.cs")).len(), 1);
        assert_eq!(cache.stats().0, 1);
    }
}
