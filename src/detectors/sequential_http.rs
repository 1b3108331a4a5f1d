//! Sequential HTTP calls detector
//!
//! Two awaited HTTP calls close together in the same method run one after
//! the other. When they are independent, `Task.WhenAll` overlaps them.

use crate::config::ThresholdConfig;
use crate::detectors::base::{code_snippet, Detector};
use crate::file_provider::FileProvider;
use crate::models::{Finding, IssueType, Severity};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static HTTP_CALLS: OnceLock<Vec<Regex>> = OnceLock::new();
static METHOD_BOUNDARY: OnceLock<Regex> = OnceLock::new();

fn http_calls() -> &'static [Regex] {
    HTTP_CALLS.get_or_init(|| {
        [
            r"HttpClient",
            r"WebClient",
            r"RestClient",
            r"HttpWebRequest",
            r"\.GetAsync\(",
            r"\.PostAsync\(",
            r"\.PutAsync\(",
            r"\.DeleteAsync\(",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn method_boundary() -> &'static Regex {
    METHOD_BOUNDARY.get_or_init(|| {
        Regex::new(r"(public|private|protected)\s+.*\s+\w+\s*\(").expect("valid regex")
    })
}

/// Whether the line makes an HTTP call of any kind
pub fn is_http_call(line: &str) -> bool {
    http_calls().iter().any(|re| re.is_match(line))
}

pub struct SequentialHttpDetector {
    /// Maximum distance in lines between the two calls
    window: usize,
}

impl SequentialHttpDetector {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn from_thresholds(thresholds: &ThresholdConfig) -> Self {
        Self::new(thresholds.http_call_window)
    }

    /// First pair of awaited calls in the same method: `(first, second)` lines
    fn first_sequential_pair(&self, lines: &[String]) -> Option<(usize, usize)> {
        let awaited: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_http_call(line) && line.contains("await"))
            .map(|(idx, _)| idx + 1)
            .collect();

        awaited.windows(2).find_map(|pair| {
            let (first, second) = (pair[0], pair[1]);
            if second - first > self.window {
                return None;
            }
            let between = lines[first - 1..second].join("\n");
            (!method_boundary().is_match(&between)).then_some((first, second))
        })
    }
}

impl Default for SequentialHttpDetector {
    fn default() -> Self {
        Self::from_thresholds(&ThresholdConfig::default())
    }
}

impl Detector for SequentialHttpDetector {
    fn name(&self) -> &'static str {
        "SequentialHttpDetector"
    }

    fn description(&self) -> &'static str {
        "Detects awaited HTTP calls that could run in parallel"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for file in files.csharp_files() {
            let lines = files.lines(file.path());
            let Some((first, second)) = self.first_sequential_pair(&lines) else {
                continue;
            };

            findings.push(
                Finding::new(
                    self.name(),
                    IssueType::SequentialHttpCalls,
                    Severity::High,
                    file.relative_path.as_str(),
                    Some(first as u32),
                    format!("Sequential HTTP calls detected (lines {} and {})", first, second),
                )
                .with_snippet(code_snippet(&lines, first, 5))
                .with_recommendation(
                    "Consider using Task.WhenAll() to execute HTTP calls in parallel if they are independent",
                ),
            );
        }

        Ok(findings)
    }
}
