//! N+1 Query Detector
//!
//! Looks for `foreach` loops whose body walks a navigation property
//! (`order.Customer.Name`) when nothing in the loop eager-loads it with
//! `.Include(...)`. Entity Framework lazy loading turns each access into
//! its own query.
//!
//! Reported at most once per file: the first suspicious loop is enough to
//! send someone to look at the data access strategy.

use crate::detectors::base::{code_snippet, Detector};
use crate::file_provider::FileProvider;
use crate::models::{Finding, IssueType, Severity};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Lines after the `foreach` that are inspected
const LOOKAHEAD_LINES: usize = 10;

static FOREACH: OnceLock<Regex> = OnceLock::new();
static NAVIGATION: OnceLock<Regex> = OnceLock::new();
static INCLUDE: OnceLock<Regex> = OnceLock::new();

fn foreach_pattern() -> &'static Regex {
    FOREACH.get_or_init(|| Regex::new(r"foreach\s*\(").expect("valid regex"))
}

fn navigation_pattern() -> &'static Regex {
    NAVIGATION.get_or_init(|| Regex::new(r"\.\w+\.\w+").expect("valid regex"))
}

fn include_pattern() -> &'static Regex {
    INCLUDE.get_or_init(|| Regex::new(r"\.Include\(").expect("valid regex"))
}

pub struct NPlusOneDetector;

impl NPlusOneDetector {
    /// 1-indexed line of the first suspicious loop
    fn first_suspicious_loop(lines: &[String]) -> Option<usize> {
        let limit = lines.len().saturating_sub(3);
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            if line_no >= limit {
                break;
            }
            if !foreach_pattern().is_match(line) {
                continue;
            }

            let end = (line_no + LOOKAHEAD_LINES).min(lines.len());
            let body = lines[line_no..end].join("\n");
            if navigation_pattern().is_match(&body) && !include_pattern().is_match(&body) {
                return Some(line_no);
            }
        }
        None
    }
}

impl Detector for NPlusOneDetector {
    fn name(&self) -> &'static str {
        "NPlusOneDetector"
    }

    fn description(&self) -> &'static str {
        "Detects navigation properties accessed in loops without eager loading"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for file in files.csharp_files() {
            let lines = files.lines(file.path());
            let Some(line_no) = Self::first_suspicious_loop(&lines) else {
                continue;
            };

            debug!("{}: possible N+1 at line {}", file.relative_path, line_no);
            findings.push(
                Finding::new(
                    self.name(),
                    IssueType::NPlusOneQuery,
                    Severity::High,
                    file.relative_path.as_str(),
                    Some(line_no as u32),
                    "Potential N+1 query: Navigation property accessed in loop without eager loading",
                )
                .with_snippet(code_snippet(&lines, line_no, 4))
                .with_recommendation(
                    "Use .Include() or .ThenInclude() to eager load related data before the loop",
                ),
            );
        }

        Ok(findings)
    }
}
