//! Database-in-loop detector
//!
//! Tracks `for`/`foreach`/`while` blocks line by line and flags data access
//! calls made inside them. Each such call is a round trip per iteration.

use crate::detectors::base::{code_snippet, Detector};
use crate::file_provider::FileProvider;
use crate::models::{Finding, IssueType, Severity};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static DB_OPERATIONS: OnceLock<Vec<Regex>> = OnceLock::new();
static LOOP_START: OnceLock<Regex> = OnceLock::new();

fn db_operations() -> &'static [Regex] {
    DB_OPERATIONS.get_or_init(|| {
        [
            r"\.SaveChanges\(\)",
            r"\.SaveChangesAsync\(\)",
            r"\.ExecuteSqlCommand",
            r"\.ExecuteSqlCommandAsync",
            r"\.Query<",
            r"\.ToList\(\)",
            r"\.ToListAsync\(\)",
            r"\.FirstOrDefault\(\)",
            r"\.FirstOrDefaultAsync\(\)",
            r"\.SingleOrDefault\(\)",
            r"\.Find\(",
            r"\.FindAsync\(",
            r"SqlCommand",
            r"SqlDataReader",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn loop_start() -> &'static Regex {
    LOOP_START.get_or_init(|| {
        Regex::new(r"\bfor\s*\(|\bforeach\s*\(|\bwhile\s*\(").expect("valid regex")
    })
}

pub struct DatabaseInLoopDetector;

impl DatabaseInLoopDetector {
    fn scan_lines(&self, rel: &str, lines: &[String]) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut in_loop = false;
        let mut loop_line = 0;
        let mut brace_depth: i64 = 0;

        for (idx, raw) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if loop_start().is_match(line) {
                in_loop = true;
                loop_line = line_no;
                brace_depth = 0;
            }

            if !in_loop {
                continue;
            }

            brace_depth += line.matches('{').count() as i64;
            brace_depth -= line.matches('}').count() as i64;

            if db_operations().iter().any(|re| re.is_match(line)) {
                findings.push(
                    Finding::new(
                        self.name(),
                        IssueType::DatabaseInLoop,
                        Severity::Critical,
                        rel,
                        Some(line_no as u32),
                        format!(
                            "Database operation detected inside loop (started at line {})",
                            loop_line
                        ),
                    )
                    .with_snippet(code_snippet(lines, line_no, 2))
                    .with_recommendation(
                        "Move database operations outside loop or use batch operations. Consider using .Include() for eager loading.",
                    ),
                );
            }

            // Back at the loop's own depth: the block has closed
            if brace_depth == 0 && line.contains('{') {
                in_loop = false;
            }
        }

        findings
    }
}

impl Detector for DatabaseInLoopDetector {
    fn name(&self) -> &'static str {
        "DatabaseInLoopDetector"
    }

    fn description(&self) -> &'static str {
        "Detects database calls made inside loops"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for file in files.csharp_files() {
            let lines = files.lines(file.path());
            findings.extend(self.scan_lines(&file.relative_path, &lines));
        }
        Ok(findings)
    }
}
