//! Large Files Detector
//!
//! Flags source files whose line count exceeds the configured thresholds.
//! Views count too: an oversized `.cshtml` is as hard to maintain as an
//! oversized controller.

use crate::config::ThresholdConfig;
use crate::detectors::base::Detector;
use crate::file_provider::FileProvider;
use crate::models::{Finding, IssueType, Severity};
use anyhow::Result;
use tracing::debug;

pub struct LargeFileDetector {
    threshold: usize,
    high_threshold: usize,
}

impl LargeFileDetector {
    pub fn new(threshold: usize, high_threshold: usize) -> Self {
        Self {
            threshold,
            high_threshold,
        }
    }

    pub fn from_thresholds(thresholds: &ThresholdConfig) -> Self {
        Self::new(thresholds.large_file_lines, thresholds.very_large_file_lines)
    }

    fn severity_for(&self, line_count: usize) -> Option<Severity> {
        if line_count > self.high_threshold {
            Some(Severity::High)
        } else if line_count > self.threshold {
            Some(Severity::Medium)
        } else {
            None
        }
    }
}

impl Default for LargeFileDetector {
    fn default() -> Self {
        Self::from_thresholds(&ThresholdConfig::default())
    }
}

impl Detector for LargeFileDetector {
    fn name(&self) -> &'static str {
        "LargeFileDetector"
    }

    fn description(&self) -> &'static str {
        "Detects files too long to maintain comfortably"
    }

    fn detect(&self, files: &dyn FileProvider) -> Result<Vec<Finding>> {
        let findings: Vec<Finding> = files
            .files()
            .iter()
            .filter_map(|file| {
                let severity = self.severity_for(file.line_count)?;
                Some(
                    Finding::new(
                        self.name(),
                        IssueType::LargeFile,
                        severity,
                        file.relative_path.as_str(),
                        None,
                        format!(
                            "File is {} lines long (threshold: {})",
                            file.line_count, self.threshold
                        ),
                    )
                    .with_recommendation(
                        "Consider refactoring into smaller, focused classes following Single Responsibility Principle",
                    ),
                )
            })
            .collect();

        debug!("LargeFileDetector found {} oversized files", findings.len());
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_provider::MockFileProvider;

    fn body(lines: usize) -> String {
        "var x = 1;\n".repeat(lines)
    }

    #[test]
    fn test_thresholds() {
        let small = body(300);
        let medium = body(301);
        let large = body(501);
        let view = body(400);
        let provider = MockFileProvider::new(vec![
            ("Small.cs", &small),
            ("Medium.cs", &medium),
            ("Large.cs", &large),
            ("Views/Home/Index.cshtml", &view),
        ]);

        let findings = LargeFileDetector::default().detect(&provider).expect("detect");
        let got: Vec<(&str, Severity)> = findings
            .iter()
            .map(|f| (f.file.as_str(), f.severity))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Medium.cs", Severity::Medium),
                ("Large.cs", Severity::High),
                ("Views/Home/Index.cshtml", Severity::Medium),
            ]
        );
        assert_eq!(findings[1].description, "File is 501 lines long (threshold: 300)");
        assert!(findings[0].line.is_none());
    }

    #[test]
    fn test_custom_thresholds() {
        let text = body(50);
        let provider = MockFileProvider::new(vec![("A.cs", &text)]);
        let findings = LargeFileDetector::new(10, 40).detect(&provider).expect("detect");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }
}
