//! Project-level configuration support
//!
//! Loads per-project configuration from `legacy-auditor.toml` or
//! `.legacy-auditorrc.json` in the audited root.
//!
//! # Configuration Format
//!
//! ```toml
//! # legacy-auditor.toml
//!
//! [hotspots]
//! enabled = true
//! threshold = 1          # endpoints above this many DB touches are hotspots
//! brace_scan = "naive"   # or "lexical"
//!
//! [thresholds]
//! large_file_lines = 300
//! very_large_file_lines = 500
//! http_call_window = 20
//!
//! [detectors.sequential-http]
//! enabled = false
//!
//! [exclude]
//! dirs = ["Migrations"]
//! paths = ["**/Generated/**", "legacy/"]
//!
//! [defaults]
//! output = "reports/audit.md"
//! format = "markdown"
//! ```

use crate::error::{AuditError, AuditResult};
use crate::hotspots::BraceScan;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project configuration loaded from the audited root
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Database hotspot options
    #[serde(default)]
    pub hotspots: HotspotConfig,

    /// Detector thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Per-detector configuration overrides
    #[serde(default)]
    pub detectors: HashMap<String, DetectorConfigOverride>,

    /// Path exclusion patterns
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// `[hotspots]` section
#[derive(Debug, Clone, Deserialize)]
pub struct HotspotConfig {
    /// Run the database hotspot analysis without the CLI flag
    #[serde(default)]
    pub enabled: bool,

    /// An endpoint is a hotspot when its total DB touches exceed this value
    #[serde(default = "default_hotspot_threshold")]
    pub threshold: usize,

    /// How method bodies are delimited
    #[serde(default)]
    pub brace_scan: BraceScan,
}

fn default_hotspot_threshold() -> usize {
    1
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: default_hotspot_threshold(),
            brace_scan: BraceScan::default(),
        }
    }
}

/// `[thresholds]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_large_file_lines")]
    pub large_file_lines: usize,

    #[serde(default = "default_very_large_file_lines")]
    pub very_large_file_lines: usize,

    /// Maximum line distance between two awaited HTTP calls to call them sequential
    #[serde(default = "default_http_call_window")]
    pub http_call_window: usize,
}

fn default_large_file_lines() -> usize {
    300
}

fn default_very_large_file_lines() -> usize {
    500
}

fn default_http_call_window() -> usize {
    20
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            large_file_lines: default_large_file_lines(),
            very_large_file_lines: default_very_large_file_lines(),
            http_call_window: default_http_call_window(),
        }
    }
}

/// Configuration override for a specific detector
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetectorConfigOverride {
    /// Whether the detector is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// `[exclude]` section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExcludeConfig {
    /// Extra directory names skipped during the walk
    #[serde(default)]
    pub dirs: Vec<String>,

    /// Paths/patterns (relative to the root) to exclude from analysis
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default report path
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Default output format (markdown, json, text)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of detector workers
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Load project configuration from the audited root.
///
/// Searches for configuration files in this order:
/// 1. `legacy-auditor.toml`
/// 2. `.legacy-auditorrc.json`
///
/// A broken config file is reported and ignored; defaults are returned.
pub fn load_project_config(repo_path: &Path) -> ProjectConfig {
    let toml_path = repo_path.join("legacy-auditor.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("{}", e);
            }
        }
    }

    let json_path = repo_path.join(".legacy-auditorrc.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("{}", e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn read_config(path: &Path) -> AuditResult<String> {
    std::fs::read_to_string(path).map_err(|source| AuditError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from a TOML file
fn load_toml_config(path: &Path) -> AuditResult<ProjectConfig> {
    let content = read_config(path)?;
    toml::from_str(&content).map_err(|e| AuditError::ConfigFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load configuration from a JSON file
fn load_json_config(path: &Path) -> AuditResult<ProjectConfig> {
    let content = read_config(path)?;
    serde_json::from_str(&content).map_err(|e| AuditError::ConfigFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl ProjectConfig {
    /// Check if a detector is enabled (defaults to true if not specified)
    pub fn is_detector_enabled(&self, name: &str) -> bool {
        let normalized = normalize_detector_name(name);

        self.detectors
            .get(&normalized)
            .or_else(|| self.detectors.get(name))
            .and_then(|c| c.enabled)
            .unwrap_or(true)
    }

    /// Check if a relative path should be excluded
    pub fn should_exclude(&self, relative_path: &str) -> bool {
        self.exclude
            .paths
            .iter()
            .any(|pattern| glob_match(pattern, relative_path))
    }
}

/// Normalize detector name for config lookup
/// Converts various formats to kebab-case for matching
pub fn normalize_detector_name(name: &str) -> String {
    // SequentialHttpDetector -> sequential-http
    // NPlusOneDetector -> n-plus-one
    // large_file -> large-file

    let mut result = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            // Hyphen before an uppercase that follows a lowercase (largeFile)
            // or that ends an acronym (HTTPCall -> http-call)
            let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('-');
            }
            result.extend(c.to_lowercase());
        } else if *c == '_' {
            result.push('-');
        } else {
            result.push(*c);
        }
    }

    result.trim_end_matches("-detector").to_string()
}

/// Simple glob pattern matching
fn glob_match(pattern: &str, path: &str) -> bool {
    // **/X/** matches when X is any directory on the path
    if pattern.starts_with("**/") && pattern.ends_with("/**") {
        let middle = pattern.trim_start_matches("**/").trim_end_matches("/**");
        return path.contains(&format!("/{}/", middle)) || path.starts_with(&format!("{}/", middle));
    }

    if pattern.contains("**") {
        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if !prefix.is_empty() && !path.starts_with(prefix) {
                return false;
            }
            if !suffix.is_empty() && !path.ends_with(suffix) {
                return false;
            }
            return true;
        }
    }

    if pattern.contains('*') {
        let parts: Vec<&str> = pattern.split('*').collect();
        if parts.len() == 2 {
            return path.starts_with(parts[0]) && path.ends_with(parts[1]);
        }
    }

    // Exact match or prefix match (for directories)
    path.starts_with(pattern) || path == pattern
}
