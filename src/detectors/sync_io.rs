//! Synchronous I/O detector
//!
//! File, stream, HTTP and ADO.NET calls that have async counterparts but
//! are used synchronously. Lines that already `await` are skipped.

use crate::detectors::base::{code_snippet, Detector};
use crate::file_provider::FileProvider;
use crate::models::{Finding, IssueType, Severity};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;

static SYNC_IO: OnceLock<Vec<Regex>> = OnceLock::new();

fn sync_io() -> &'static [Regex] {
    SYNC_IO.get_or_init(|| {
        [
            r"File\.ReadAllText\(",
            r"File\.ReadAllLines\(",
            r"File\.WriteAllText\(",
            r"File\.WriteAllLines\(",
            r"StreamReader\.Read\(",
            r"StreamWriter\.Write\(",
            r"HttpClient\..*\(",
            r"WebClient\.",
            r"SqlCommand\.Execute",
            r"SqlDataReader\.Read\(",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

/// Whether the line performs blocking I/O
pub fn is_sync_io(line: &str) -> bool {
    sync_io().iter().any(|re| re.is_match(line))
}

pub struct SyncIoDetector;

impl Detector for SyncIoDetector {
    fn name(&self) -> &'static str {
        "SyncIoDetector"
    }

    fn description(&self) -> &'static str {
        "Detects synchronous I/O with async alternatives"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for file in files.csharp_files() {
            let lines = files.lines(file.path());
            for (idx, line) in lines.iter().enumerate() {
                if line.contains("await") || !is_sync_io(line) {
                    continue;
                }
                let line_no = idx + 1;
                findings.push(
                    Finding::new(
                        self.name(),
                        IssueType::NoAsyncUsage,
                        Severity::Medium,
                        file.relative_path.as_str(),
                        Some(line_no as u32),
                        "Synchronous I/O operation detected",
                    )
                    .with_snippet(code_snippet(&lines, line_no, 2))
                    .with_recommendation(
                        "Replace with async equivalent (e.g., File.ReadAllTextAsync, HttpClient with await)",
                    ),
                );
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_provider::MockFileProvider;

    #[test]
    fn test_sync_io_once_per_line() {
        let source = "\
var text = File.ReadAllText(path); File.WriteAllText(copy, text);
var more = await File.ReadAllTextAsync(path);
reader = SqlDataReader.Read();
";
        let provider = MockFileProvider::new(vec![("Services/ImportService.cs", source)]);
        let findings = SyncIoDetector.detect(&provider).expect("detect");

        let lines: Vec<Option<u32>> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![Some(1), Some(3)]);
        assert_eq!(findings[0].issue_type, IssueType::NoAsyncUsage);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_is_sync_io() {
        assert!(!is_sync_io("new WebClient().DownloadString(url)"));
        assert!(is_sync_io("WebClient.DownloadString(url)"));
        assert!(!is_sync_io("var x = 1;"));
    }
}
