//! Core data models for the legacy auditor
//!
//! These models are shared by the scanner, classifier, detectors,
//! hotspot analysis and reporters.

use crate::architecture::ClassDependencyGraph;
use crate::hotspots::DbHotspotReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Generate a deterministic finding ID based on content hash.
///
/// The same detector reporting the same title at the same location yields
/// the same 16-character hex ID on every run, so findings can be tracked
/// across audits of the same tree.
pub fn deterministic_finding_id(detector: &str, file: &str, line: u32, title: &str) -> String {
    let input = format!("{detector}\n{file}\n{line}\n{title}");
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(input.as_bytes()))
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Title-case label used in Markdown tables
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Kinds of modernization issues the detectors report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueType {
    LargeFile,
    DatabaseInLoop,
    SynchronousBlocking,
    SequentialHttpCalls,
    DuplicatePattern,
    NoAsyncUsage,
    NPlusOneQuery,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::LargeFile => "LargeFile",
            IssueType::DatabaseInLoop => "DatabaseInLoop",
            IssueType::SynchronousBlocking => "SynchronousBlocking",
            IssueType::SequentialHttpCalls => "SequentialHttpCalls",
            IssueType::DuplicatePattern => "DuplicatePattern",
            IssueType::NoAsyncUsage => "NoAsyncUsage",
            IssueType::NPlusOneQuery => "NPlusOneQuery",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected performance or modernization issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub detector: String,
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Relative path of the offending file (or a comma-joined list for cross-file findings)
    pub file: String,
    /// 1-indexed line, `None` for file-level findings
    #[serde(default)]
    pub line: Option<u32>,
    pub description: String,
    #[serde(default)]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

impl Finding {
    /// Build a finding with a deterministic ID derived from its location.
    pub fn new(
        detector: &str,
        issue_type: IssueType,
        severity: Severity,
        file: impl Into<String>,
        line: Option<u32>,
        description: impl Into<String>,
    ) -> Self {
        let file = file.into();
        let description = description.into();
        Self {
            id: deterministic_finding_id(detector, &file, line.unwrap_or(0), &description),
            detector: detector.to_string(),
            issue_type,
            severity,
            file,
            line,
            description,
            code_snippet: None,
            recommendation: None,
        }
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        if !snippet.is_empty() {
            self.code_snippet = Some(snippet);
        }
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Architectural role of a source file, inferred from naming conventions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum FileRole {
    Controller,
    ApiController,
    Service,
    Repository,
    Model,
    View,
    Config,
    #[default]
    Unknown,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Controller => "Controller",
            FileRole::ApiController => "ApiController",
            FileRole::Service => "Service",
            FileRole::Repository => "Repository",
            FileRole::Model => "Model",
            FileRole::View => "View",
            FileRole::Config => "Config",
            FileRole::Unknown => "Unknown",
        }
    }

    pub fn is_controller(&self) -> bool {
        matches!(self, FileRole::Controller | FileRole::ApiController)
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned source file with its classification metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the audited root, always `/`-separated
    pub relative_path: String,
    #[serde(default)]
    pub role: FileRole,
    pub line_count: usize,
    #[serde(default)]
    pub class_names: Vec<String>,
    #[serde(default)]
    pub method_names: Vec<String>,
    #[serde(default)]
    pub has_async: bool,
    #[serde(default)]
    pub has_entity_framework: bool,
    #[serde(default)]
    pub has_sql: bool,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<String>, line_count: usize) -> Self {
        Self {
            path: path.into(),
            relative_path: relative_path.into(),
            role: FileRole::Unknown,
            line_count,
            class_names: Vec::new(),
            method_names: Vec::new(),
            has_async: false,
            has_entity_framework: false,
            has_sql: false,
        }
    }

    pub fn extension(&self) -> &str {
        self.path.extension().and_then(|e| e.to_str()).unwrap_or("")
    }

    pub fn is_csharp(&self) -> bool {
        self.extension() == "cs"
    }

    /// File name without extension
    pub fn stem(&self) -> &str {
        self.path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
    }

    /// The class this file is known by: first declared class, else the file stem
    pub fn primary_class(&self) -> &str {
        self.class_names
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.stem())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One detected controller action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub controller: String,
    pub action: String,
    pub route: String,
    /// Relative path of the controller file
    pub file: String,
}

impl Endpoint {
    pub fn new(controller: impl Into<String>, action: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            route: route.into(),
            file: String::new(),
        }
    }

    /// `Controller.Action`
    pub fn name(&self) -> String {
        format!("{}.{}", self.controller, self.action)
    }
}

/// Per-file opportunity notes collected alongside findings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Opportunities {
    pub async_await: Vec<String>,
    pub signalr: Vec<String>,
    pub queue: Vec<String>,
}

/// Complete audit output handed to the reporters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub project_path: String,
    pub generated_at: String,
    pub total_files: usize,
    pub analyzed_files: usize,
    pub file_structure: BTreeMap<FileRole, usize>,
    pub files: Vec<SourceFile>,
    pub endpoints: Vec<Endpoint>,
    pub findings: Vec<Finding>,
    pub findings_summary: FindingsSummary,
    pub opportunities: Opportunities,
    #[serde(default)]
    pub class_dependencies: ClassDependencyGraph,
    pub database_hotspot_mode: bool,
    pub database: DbHotspotReport,
}

impl AuditReport {
    pub fn total_issues(&self) -> usize {
        self.findings.len()
    }

    pub fn findings_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Number of distinct files that have at least one finding
    pub fn files_with_issues(&self) -> usize {
        let files: std::collections::HashSet<&str> =
            self.findings.iter().map(|f| f.file.as_str()).collect();
        files.len()
    }

    pub fn role_count(&self, role: FileRole) -> usize {
        self.file_structure.get(&role).copied().unwrap_or(0)
    }
}

/// Count files per role
pub fn file_structure(files: &[SourceFile]) -> BTreeMap<FileRole, usize> {
    let mut structure = BTreeMap::new();
    for file in files {
        *structure.entry(file.role).or_insert(0) += 1;
    }
    structure
}
