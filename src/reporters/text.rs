//! Text (terminal) reporter with colors and formatting

use crate::models::{AuditReport, Finding, Severity};
use anyhow::Result;

/// Severity colors
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
        Severity::Info => "\x1b[90m",     // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Findings listed in the table
const TOP_FINDINGS: usize = 10;

/// Severity tag
fn severity_tag(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Info => "[I]",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AuditReport) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}Legacy .NET Audit{RESET}  {DIM}{}{RESET}\n", report.project_path));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Files: {} scanned, {} analyzed  Endpoints: {}\n\n",
        report.total_files,
        report.analyzed_files,
        report.endpoints.len()
    ));

    // Findings summary
    let fs = &report.findings_summary;
    out.push_str(&format!("{BOLD}FINDINGS{RESET} ({} total)\n", fs.total));

    let mut summary_parts = Vec::new();
    if fs.critical > 0 {
        summary_parts.push(format!("\x1b[31m{} critical{RESET}", fs.critical));
    }
    if fs.high > 0 {
        summary_parts.push(format!("\x1b[91m{} high{RESET}", fs.high));
    }
    if fs.medium > 0 {
        summary_parts.push(format!("\x1b[33m{} medium{RESET}", fs.medium));
    }
    if fs.low > 0 {
        summary_parts.push(format!("\x1b[34m{} low{RESET}", fs.low));
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    // Top findings as table
    if !report.findings.is_empty() {
        out.push_str(&format!(
            "{DIM}  #   SEV   TYPE                   FILE{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));

        for (i, finding) in report.findings.iter().take(TOP_FINDINGS).enumerate() {
            let sev_c = severity_color(&finding.severity);
            let sev_tag = severity_tag(&finding.severity);

            out.push_str(&format!(
                "  {DIM}{:>3}{RESET}  {sev_c}{}{RESET}  {:<22} {DIM}{}{RESET}\n",
                i + 1,
                sev_tag,
                finding.issue_type.as_str(),
                format_file_location(finding)
            ));
        }

        let remaining = report.findings.len().saturating_sub(TOP_FINDINGS);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {DIM}...and {} more (use --format markdown for the full report){RESET}\n",
                remaining
            ));
        }
        out.push('\n');
    }

    if report.database_hotspot_mode {
        out.push_str(&format!("{BOLD}DATABASE HOTSPOTS{RESET} ({})\n", report.database.hotspots.len()));
        for hotspot in report.database.hotspots.iter().take(TOP_FINDINGS) {
            out.push_str(&format!(
                "  {:<40} {DIM}{}{RESET}  {} DB touches\n",
                hotspot.endpoint, hotspot.route, hotspot.total_db_touches
            ));
        }
        out.push('\n');
    }

    Ok(out)
}

/// `file:line`, shortened from the left when long
fn format_file_location(finding: &Finding) -> String {
    let file = finding.file.as_str();
    let short_file = if file.chars().count() > 40 {
        let skip = file.chars().count() - 37;
        format!("...{}", file.chars().skip(skip).collect::<String>())
    } else {
        file.to_string()
    };
    match finding.line {
        Some(line) => format!("{}:{}", short_file, line),
        None => short_file,
    }
}
