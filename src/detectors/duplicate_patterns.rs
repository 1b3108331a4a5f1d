//! Duplicate pattern detector
//!
//! Cross-file detector. Collects method signatures from every C# file and
//! reports signatures declared in more than one file, plus common CRUD
//! method names repeated across many repositories.
//!
//! Signatures are compared after collapsing whitespace, so formatting
//! differences do not hide a copy.

use crate::detectors::base::Detector;
use crate::file_provider::FileProvider;
use crate::models::{FileRole, Finding, IssueType, Severity};
use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Framework entry points that every project declares
const IGNORED_METHODS: &[&str] = &["Main", "Configure", "Dispose"];

/// CRUD names a generic repository would provide
const REPOSITORY_METHODS: &[&str] = &["GetById", "GetAll", "Add", "Update", "Delete", "Save", "Find"];

/// Files listed in a cross-file finding
const MAX_LISTED_FILES: usize = 3;

/// Signature characters quoted in the description
const SIGNATURE_PREVIEW_CHARS: usize = 80;

static SIGNATURE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE: OnceLock<Regex> = OnceLock::new();
static REPOSITORY_METHOD_NAMES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn signature() -> &'static Regex {
    SIGNATURE.get_or_init(|| {
        Regex::new(
            r"(?:public|private|protected)\s+(?:static\s+)?(?:async\s+)?(?:\w+(?:<[^>\n]*>)?)\s+(\w+)\s*\([^)]*\)",
        )
        .expect("valid regex")
    })
}

fn whitespace() -> &'static Regex {
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn repository_method_names() -> &'static [(&'static str, Regex)] {
    REPOSITORY_METHOD_NAMES.get_or_init(|| {
        REPOSITORY_METHODS
            .iter()
            .map(|name| (*name, Regex::new(&format!(r"\b{name}\b")).expect("valid regex")))
            .collect()
    })
}

/// Method signatures declared in `content`, whitespace-collapsed
pub fn method_signatures(content: &str) -> Vec<String> {
    signature()
        .captures_iter(content)
        .filter(|caps| !IGNORED_METHODS.contains(&&caps[1]))
        .map(|caps| whitespace().replace_all(&caps[0], " ").into_owned())
        .collect()
}

fn listed_files(files: &IndexSet<String>) -> String {
    files
        .iter()
        .take(MAX_LISTED_FILES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn preview(signature: &str) -> String {
    signature.chars().take(SIGNATURE_PREVIEW_CHARS).collect()
}

pub struct DuplicatePatternDetector;

impl Detector for DuplicatePatternDetector {
    fn name(&self) -> &'static str {
        "DuplicatePatternDetector"
    }

    fn description(&self) -> &'static str {
        "Detects method signatures and repository methods repeated across files"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        // signature -> files declaring it, both in first-seen order
        let mut signatures: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut repository_methods: IndexMap<&'static str, IndexSet<String>> = IndexMap::new();

        for file in files.csharp_files() {
            let content = files.content(file.path());
            for sig in method_signatures(&content) {
                signatures
                    .entry(sig)
                    .or_default()
                    .insert(file.relative_path.clone());
            }

            if file.role == FileRole::Repository {
                for (name, pattern) in repository_method_names() {
                    if pattern.is_match(&content) {
                        repository_methods
                            .entry(name)
                            .or_default()
                            .insert(file.relative_path.clone());
                    }
                }
            }
        }

        let mut findings = Vec::new();

        for (sig, declared_in) in signatures.iter().filter(|(_, f)| f.len() > 1) {
            findings.push(
                Finding::new(
                    self.name(),
                    IssueType::DuplicatePattern,
                    Severity::Medium,
                    listed_files(declared_in),
                    None,
                    format!(
                        "Duplicate method pattern found in {} files: {}...",
                        declared_in.len(),
                        preview(sig)
                    ),
                )
                .with_recommendation(
                    "Consider extracting common logic into a shared service or base class",
                ),
            );
        }

        for (name, repos) in repository_methods.iter().filter(|(_, f)| f.len() > 2) {
            findings.push(
                Finding::new(
                    self.name(),
                    IssueType::DuplicatePattern,
                    Severity::Low,
                    listed_files(repos),
                    None,
                    format!("Repository pattern '{}' repeated in {} repositories", name, repos.len()),
                )
                .with_recommendation(
                    "Consider using a generic repository pattern or base repository class",
                ),
            );
        }

        debug!(
            "DuplicatePatternDetector: {} signatures tracked, {} findings",
            signatures.len(),
            findings.len()
        );
        Ok(findings)
    }

    fn is_cross_file(&self) -> bool {
        true
    }
}
