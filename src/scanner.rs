//! Source file discovery
//!
//! Walks the audited root for `.cs` and `.cshtml` files, skipping build
//! output and tooling directories. `.gitignore` and `.auditignore` files are
//! honoured.

use crate::cache::FileCache;
use crate::config::ProjectConfig;
use crate::error::{AuditError, AuditResult};
use crate::models::SourceFile;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Directories never descended into
pub const EXCLUDED_DIRS: &[&str] = &[
    "bin",
    "obj",
    "packages",
    "node_modules",
    ".git",
    ".vs",
    "TestResults",
    "Debug",
    "Release",
    ".vscode",
    ".idea",
];

/// File extensions included in the audit
pub const SUPPORTED_EXTENSIONS: &[&str] = &["cs", "cshtml"];

/// Check that `root` is an existing directory and canonicalize it.
pub fn validate_root(root: &Path) -> AuditResult<PathBuf> {
    if !root.exists() {
        return Err(AuditError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(AuditError::NotADirectory(root.to_path_buf()));
    }
    Ok(root.canonicalize()?)
}

/// Walk `root` and return every supported file, sorted by path.
///
/// Line counts come from the shared cache, so the file contents are read
/// once for the whole audit.
pub fn scan(root: &Path, config: &ProjectConfig, cache: &FileCache) -> AuditResult<Vec<SourceFile>> {
    let root = validate_root(root)?;
    let excluded: Arc<HashSet<String>> = Arc::new(
        EXCLUDED_DIRS
            .iter()
            .map(|d| d.to_string())
            .chain(config.exclude.dirs.iter().cloned())
            .collect(),
    );

    let mut builder = WalkBuilder::new(&root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(".auditignore");
    let filter_dirs = Arc::clone(&excluded);
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        !(is_dir && entry.depth() > 0 && filter_dirs.contains(entry.file_name().to_string_lossy().as_ref()))
    });

    let mut paths = Vec::new();
    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
        if !supported {
            continue;
        }
        let relative = relative_path(&root, path);
        if config.should_exclude(&relative) {
            debug!("Excluded by config: {}", relative);
            continue;
        }
        paths.push((path.to_path_buf(), relative));
    }
    paths.sort();

    let to_read: Vec<PathBuf> = paths.iter().map(|(path, _)| path.clone()).collect();
    cache.warm(&to_read);

    let files: Vec<SourceFile> = paths
        .into_iter()
        .map(|(path, relative)| {
            let line_count = cache.lines(&path).len();
            SourceFile::new(path, relative, line_count)
        })
        .collect();

    info!("Discovered {} source files under {}", files.len(), root.display());
    Ok(files)
}

/// `/`-separated path relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
