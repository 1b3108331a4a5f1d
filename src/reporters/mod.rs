//! Output reporters for audit results
//!
//! Supports multiple output formats:
//! - `markdown` - The full audit report with Mermaid diagrams (default)
//! - `json` - Machine-readable JSON of the whole `AuditReport`
//! - `text` - Terminal summary with colors

mod json;
mod markdown;
mod text;

pub use markdown::{mermaid_id, severity_icon};

use crate::models::AuditReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: markdown, json, text",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Render an audit report in the specified format
pub fn report(report: &AuditReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render an audit report using an OutputFormat enum
pub fn report_with_format(report: &AuditReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => markdown::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Text => text::render(report),
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Markdown => "md",
        OutputFormat::Json => "json",
        OutputFormat::Text => "txt",
    }
}
