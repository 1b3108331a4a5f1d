//! Synchronous blocking detector
//!
//! `.Result`, `.Wait()` and `.GetAwaiter().GetResult()` park a thread
//! until a task completes. Under ASP.NET this starves the request pool and
//! can deadlock on the synchronization context.

use crate::detectors::base::{code_snippet, Detector};
use crate::file_provider::FileProvider;
use crate::models::{Finding, IssueType, Severity};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static BLOCKING_CALLS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn blocking_calls() -> &'static [(Regex, &'static str)] {
    BLOCKING_CALLS.get_or_init(|| {
        [
            (r"\.Result\b", "Task.Result blocks the thread"),
            (r"\.Wait\(\)", "Task.Wait() blocks the thread"),
            (
                r"\.GetAwaiter\(\)\.GetResult\(\)",
                "GetAwaiter().GetResult() blocks the thread",
            ),
        ]
        .into_iter()
        .map(|(p, label)| (Regex::new(p).expect("valid regex"), label))
        .collect()
    })
}

pub struct SyncBlockingDetector;

impl Detector for SyncBlockingDetector {
    fn name(&self) -> &'static str {
        "SyncBlockingDetector"
    }

    fn description(&self) -> &'static str {
        "Detects blocking waits on tasks"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for file in files.csharp_files() {
            let lines = files.lines(file.path());
            for (idx, line) in lines.iter().enumerate() {
                let line_no = idx + 1;
                // One finding per matching pattern
                for (pattern, label) in blocking_calls() {
                    if !pattern.is_match(line) {
                        continue;
                    }
                    findings.push(
                        Finding::new(
                            self.name(),
                            IssueType::SynchronousBlocking,
                            Severity::Critical,
                            file.relative_path.as_str(),
                            Some(line_no as u32),
                            format!("Synchronous blocking call detected: {}", label),
                        )
                        .with_snippet(code_snippet(&lines, line_no, 2))
                        .with_recommendation(
                            "Replace with 'await' and make the containing method async",
                        ),
                    );
                }
            }
        }

        Ok(findings)
    }
}
