//! Markdown reporter
//!
//! Renders the full audit as GitHub-flavored Markdown with Mermaid
//! diagrams. Sections are rendered independently and joined by a blank
//! line; each section has an explicit empty state.

use crate::architecture::ClassDependencyGraph;
use crate::models::{AuditReport, FileRole, Finding, IssueType, Severity};
use anyhow::Result;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Critical and high issues shown in full
const MAX_DETAILED_ISSUES: usize = 20;
/// Rows in the hotspot table
const MAX_HOTSPOT_ROWS: usize = 20;
/// Endpoints listed in the inferred call graph
const MAX_CALL_GRAPH_ENTRIES: usize = 30;
/// Chains shown per endpoint before the "... N more" line
const MAX_CHAINS_PER_ENDPOINT: usize = 3;
/// Stored procedures and SQL fragments listed
const MAX_SQL_ITEMS: usize = 50;
/// Opportunity entries listed per section
const MAX_OPPORTUNITIES: usize = 10;

const DISABLED_HOTSPOTS: &str = "_Disabled (run with `--database-hotspot-mode` to enable)_";

static NON_ID_CHARS: OnceLock<Regex> = OnceLock::new();

fn non_id_chars() -> &'static Regex {
    NON_ID_CHARS.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"))
}

/// Render report as Markdown
pub fn render(report: &AuditReport) -> Result<String> {
    let sections = [
        render_header(report),
        render_executive_summary(report),
        render_file_structure(report),
        render_architecture(report),
        render_endpoint_map(report),
        render_database_hotspots(report),
        render_sql_checklist(report),
        render_performance_risks(report),
        render_async_opportunities(report),
        render_signalr_opportunities(report),
        render_queue_opportunities(report),
        render_roadmap(report),
        render_detailed_issues(report),
    ];
    Ok(sections.join("\n\n"))
}

pub fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟡",
        Severity::Medium => "🟠",
        Severity::Low => "🔵",
        Severity::Info => "ℹ️",
    }
}

/// Mermaid-safe node id
pub fn mermaid_id(value: &str) -> String {
    let normalized = non_id_chars().replace_all(value, "_").into_owned();
    if normalized.is_empty() {
        return "UnknownNode".to_string();
    }
    if normalized.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("N_{normalized}");
    }
    normalized
}

fn render_header(report: &AuditReport) -> String {
    format!(
        "# Legacy .NET Audit Report

**Project:** {}
**Generated:** {}
**Files Scanned:** {}
**Files Analyzed:** {}

---",
        report.project_path, report.generated_at, report.total_files, report.analyzed_files
    )
}

fn render_executive_summary(report: &AuditReport) -> String {
    let summary = &report.findings_summary;
    let badge = if summary.critical > 0 {
        "🔴 Critical"
    } else if summary.high > 0 {
        "🟡 Warning"
    } else {
        "🟢 Good"
    };

    format!(
        "## 📊 Executive Summary

**Overall Status:** {}

- **Total Issues Found:** {}
- **Critical Issues:** {}
- **High Priority Issues:** {}
- **Files with Issues:** {}

### Quick Stats
- **Controllers:** {} files
- **API Controllers:** {} files
- **Services:** {} files
- **Repositories:** {} files
",
        badge,
        report.total_issues(),
        summary.critical,
        summary.high,
        report.files_with_issues(),
        report.role_count(FileRole::Controller),
        report.role_count(FileRole::ApiController),
        report.role_count(FileRole::Service),
        report.role_count(FileRole::Repository),
    )
}

fn render_file_structure(report: &AuditReport) -> String {
    let mut lines = vec![
        "## 📁 File Structure Summary".to_string(),
        String::new(),
        "| File Type | Count |".to_string(),
        "|-----------|-------|".to_string(),
    ];

    let mut counts: Vec<(&FileRole, &usize)> = report.file_structure.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));
    for (role, count) in counts.into_iter().filter(|(_, c)| **c > 0) {
        lines.push(format!("| {} | {} |", role, count));
    }

    lines.join("\n")
}

fn render_architecture(report: &AuditReport) -> String {
    let mut lines = vec![
        "## 🧭 Architecture Diagrams".to_string(),
        String::new(),
        "These diagrams are inferred from file classification and class references.".to_string(),
        String::new(),
    ];
    lines.extend(layer_overview(report));
    lines.push(String::new());
    lines.extend(class_dependency_diagram(&report.class_dependencies));
    lines.join("\n")
}

fn layer_overview(report: &AuditReport) -> Vec<String> {
    let ui = report.role_count(FileRole::Controller) + report.role_count(FileRole::ApiController);
    vec![
        "### Layer Overview".to_string(),
        String::new(),
        "```mermaid".to_string(),
        "flowchart LR".to_string(),
        format!("  UI[\"Controllers/API ({})\"]", ui),
        format!("  VIEW[\"Views ({})\"]", report.role_count(FileRole::View)),
        format!("  SVC[\"Services ({})\"]", report.role_count(FileRole::Service)),
        format!("  REPO[\"Repositories ({})\"]", report.role_count(FileRole::Repository)),
        format!("  MODEL[\"Models ({})\"]", report.role_count(FileRole::Model)),
        "  DATA[(\"Data Store\")]".to_string(),
        String::new(),
        "  UI --> SVC".to_string(),
        "  SVC --> REPO".to_string(),
        "  REPO --> DATA".to_string(),
        "  UI -.uses.-> MODEL".to_string(),
        "  SVC -.uses.-> MODEL".to_string(),
        "  VIEW -.binds.-> MODEL".to_string(),
        "  UI --> VIEW".to_string(),
        "```".to_string(),
    ]
}

fn class_dependency_diagram(graph: &ClassDependencyGraph) -> Vec<String> {
    let heading = "### Inferred Class Dependencies".to_string();
    if graph.nodes.is_empty() {
        return vec![heading, String::new(), "_Insufficient data to infer dependencies._".to_string()];
    }
    if graph.edges.is_empty() {
        return vec![heading, String::new(), "_No cross-class dependencies inferred._".to_string()];
    }

    let mut lines = vec![
        heading,
        String::new(),
        "```mermaid".to_string(),
        "flowchart TD".to_string(),
    ];
    for node in &graph.nodes {
        lines.push(format!("  {}[\"{} ({})\"]", mermaid_id(&node.name), node.name, node.role));
    }
    lines.push(String::new());
    for edge in &graph.edges {
        lines.push(format!("  {} --> {}", mermaid_id(&edge.source), mermaid_id(&edge.target)));
    }
    lines.push("```".to_string());
    lines.push(String::new());
    lines.push(
        "_Dependency edges are heuristic and intended for architecture exploration, not strict compile-time truth._"
            .to_string(),
    );
    lines
}

fn render_endpoint_map(report: &AuditReport) -> String {
    let mut lines = vec!["## 🌐 Endpoint Map".to_string(), String::new()];
    if report.endpoints.is_empty() {
        lines.push("_No endpoints detected_".to_string());
        return lines.join("\n");
    }

    lines.push("| Controller | Method | Route/Action |".to_string());
    lines.push("|------------|--------|--------------|".to_string());
    for endpoint in &report.endpoints {
        lines.push(format!(
            "| {} | {} | {} |",
            endpoint.controller, endpoint.action, endpoint.route
        ));
    }
    lines.join("\n")
}

/// What a hotspot has more of than the threshold
fn touch_label(threshold: usize) -> String {
    match threshold {
        1 => "multiple DB touches".to_string(),
        n => format!("more than {n} DB touches"),
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if word != "DB" => first.to_uppercase().chain(chars).collect(),
                _ => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_database_hotspots(report: &AuditReport) -> String {
    let mut lines = vec!["## 🧪 Database Hotspot Mode".to_string(), String::new()];
    if !report.database_hotspot_mode {
        lines.push(DISABLED_HOTSPOTS.to_string());
        return lines.join("\n");
    }

    let db = &report.database;
    lines.push(format!("- Endpoint call paths analyzed: **{}**", db.call_graph.len()));
    lines.push(format!(
        "- Endpoints with {}: **{}**",
        touch_label(db.threshold),
        db.hotspots.len()
    ));
    lines.push(String::new());

    if db.hotspots.is_empty() {
        let limit = match db.threshold {
            1 => "one inferred DB touch".to_string(),
            n => format!("{n} inferred DB touches"),
        };
        lines.push(format!("✅ No endpoints exceeded {limit}."));
    } else {
        lines.push(format!("### Endpoints With {}", title_case(&touch_label(db.threshold))));
        lines.push(String::new());
        lines.push("| Endpoint | Route | DB Touches |".to_string());
        lines.push("|----------|-------|------------|".to_string());
        for hotspot in db.hotspots.iter().take(MAX_HOTSPOT_ROWS) {
            lines.push(format!(
                "| {} | {} | {} |",
                hotspot.endpoint, hotspot.route, hotspot.total_db_touches
            ));
        }
    }
    lines.push(String::new());

    lines.push("### Inferred Call Graph (controller -> service -> repository)".to_string());
    lines.push(String::new());
    if db.call_graph.is_empty() {
        lines.push("_No endpoint call graph data available._".to_string());
        return lines.join("\n");
    }

    for entry in db.call_graph.iter().take(MAX_CALL_GRAPH_ENTRIES) {
        lines.push(format!(
            "- **{}** ({} DB touches)",
            entry.endpoint, entry.total_db_touches
        ));
        for chain in entry.chains.iter().take(MAX_CHAINS_PER_ENDPOINT) {
            lines.push(format!("  - `{}`", chain));
        }
        let extra = entry.chains.len().saturating_sub(MAX_CHAINS_PER_ENDPOINT);
        if extra > 0 {
            lines.push(format!("  - _... {} more inferred paths_", extra));
        }
    }
    lines.join("\n")
}

fn render_sql_checklist(report: &AuditReport) -> String {
    let mut lines = vec![
        "## 🧾 Stored Procedures & Join Review Checklist".to_string(),
        String::new(),
    ];
    if !report.database_hotspot_mode {
        lines.push(DISABLED_HOTSPOTS.to_string());
        return lines.join("\n");
    }

    lines.extend(
        [
            "### Checklist",
            "- [ ] Validate all stored procedure result cardinality assumptions",
            "- [ ] Confirm every SQL join has indexed predicates on join/filter columns",
            "- [ ] Review execution plans for the listed SQL fragments",
            "- [ ] Verify SQL uses parameterization for user inputs",
            "- [ ] Ensure SP/SQL calls include timeout and error handling strategy",
            "",
            "### Referenced Stored Procedures",
            "",
        ]
        .map(String::from),
    );
    push_code_list(
        &mut lines,
        &report.database.stored_procedures,
        "_No stored procedure references detected_",
    );

    lines.push(String::new());
    lines.push("### SQL Fragments Found".to_string());
    lines.push(String::new());
    push_code_list(
        &mut lines,
        &report.database.sql_fragments,
        "_No SQL fragments detected_",
    );
    lines.join("\n")
}

fn push_code_list(lines: &mut Vec<String>, items: &[String], empty: &str) {
    if items.is_empty() {
        lines.push(empty.to_string());
        return;
    }
    lines.extend(items.iter().take(MAX_SQL_ITEMS).map(|item| format!("- `{}`", item)));
}

fn render_performance_risks(report: &AuditReport) -> String {
    let mut lines = vec!["## ⚠️ Performance Risk Summary".to_string(), String::new()];

    // issue type -> (count, severity of the first finding of that type)
    let mut by_type: IndexMap<IssueType, (usize, Severity)> = IndexMap::new();
    for finding in &report.findings {
        by_type
            .entry(finding.issue_type)
            .or_insert((0, finding.severity))
            .0 += 1;
    }

    if by_type.is_empty() {
        lines.push("✅ **No major performance risks detected!**".to_string());
        return lines.join("\n");
    }

    lines.push("| Issue Type | Count | Severity |".to_string());
    lines.push("|------------|-------|----------|".to_string());

    let mut rows: Vec<(IssueType, usize, Severity)> = by_type
        .into_iter()
        .map(|(issue_type, (count, severity))| (issue_type, count, severity))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    for (issue_type, count, severity) in rows {
        lines.push(format!(
            "| {} | {} | {} {} |",
            issue_type,
            count,
            severity_icon(severity),
            severity.label()
        ));
    }
    lines.join("\n")
}

fn push_capped(lines: &mut Vec<String>, items: &[String]) {
    lines.extend(items.iter().take(MAX_OPPORTUNITIES).map(|item| format!("- {}", item)));
    if items.len() > MAX_OPPORTUNITIES {
        lines.push(format!("\n_... and {} more_", items.len() - MAX_OPPORTUNITIES));
    }
}

fn render_async_opportunities(report: &AuditReport) -> String {
    let mut lines = vec!["## 🚀 Async/Await Opportunities".to_string(), String::new()];
    let opportunities = &report.opportunities.async_await;
    if opportunities.is_empty() {
        lines.push("✅ **Async patterns are well utilized or not applicable**".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "Found **{}** opportunities to introduce async/await:",
        opportunities.len()
    ));
    lines.push(String::new());
    push_capped(&mut lines, opportunities);
    lines.join("\n")
}

fn render_signalr_opportunities(report: &AuditReport) -> String {
    let mut lines = vec!["## 📡 Real-time (SignalR) Opportunities".to_string(), String::new()];
    let opportunities = &report.opportunities.signalr;
    if opportunities.is_empty() {
        lines.push("_No obvious real-time patterns detected_".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "Found **{}** potential real-time use cases:",
        opportunities.len()
    ));
    lines.push(String::new());
    lines.push("These areas use polling or timers and could benefit from SignalR:".to_string());
    lines.push(String::new());
    push_capped(&mut lines, opportunities);
    lines.join("\n")
}

fn render_queue_opportunities(report: &AuditReport) -> String {
    let mut lines = vec![
        "## 🔄 Background Queue Opportunities".to_string(),
        String::new(),
        "Consider using message queues (RabbitMQ, Azure Queue, Hangfire) for:".to_string(),
        String::new(),
    ];
    let candidates = &report.opportunities.queue;
    if candidates.is_empty() {
        lines.push("_No obvious background job candidates detected_".to_string());
    } else {
        lines.extend(
            candidates
                .iter()
                .take(MAX_OPPORTUNITIES)
                .map(|c| format!("- {}", c)),
        );
    }
    lines.join("\n")
}

fn roadmap_items(items: &[&str], issue_count: usize) -> String {
    let mut lines = Vec::new();
    if issue_count > 0 {
        lines.push(format!("**{} issues to address:**\n", issue_count));
    }
    lines.extend(items.iter().map(|item| format!("- [ ] {}", item)));
    lines.join("\n")
}

fn render_roadmap(report: &AuditReport) -> String {
    let summary = &report.findings_summary;
    format!(
        "## 🗺️ Recommended Modernization Roadmap

### Phase 1: Critical Fixes (Immediate)
**Priority:** 🔴 Critical
**Timeline:** 1-2 weeks

{}

### Phase 2: Performance Optimization
**Priority:** 🟡 High
**Timeline:** 2-4 weeks

{}

### Phase 3: Architecture Modernization
**Priority:** 🟢 Medium
**Timeline:** 1-2 months

{}

### Phase 4: Platform Migration
**Priority:** 🔵 Future
**Timeline:** 3-6 months

{}
",
        roadmap_items(
            &[
                "Fix all synchronous blocking calls (.Result, .Wait())",
                "Eliminate database operations inside loops",
                "Address N+1 query problems",
            ],
            summary.critical
        ),
        roadmap_items(
            &[
                "Refactor large controllers (>300 lines)",
                "Implement async/await throughout I/O operations",
                "Parallelize independent HTTP calls with Task.WhenAll()",
            ],
            summary.high
        ),
        roadmap_items(
            &[
                "Introduce SignalR for real-time features",
                "Implement background job processing (Hangfire/Azure Functions)",
                "Consolidate duplicate repository patterns",
                "Apply CQRS pattern where appropriate",
            ],
            report.total_issues()
        ),
        roadmap_items(
            &[
                "Migrate to .NET 8/9",
                "Adopt minimal APIs for new endpoints",
                "Implement containerization (Docker)",
                "Set up CI/CD pipeline improvements",
            ],
            0
        ),
    )
}

fn render_detailed_issues(report: &AuditReport) -> String {
    let mut lines = vec!["## 📋 Detailed Issues".to_string(), String::new()];
    let critical: Vec<&Finding> = report.findings_with(Severity::Critical).collect();
    let high: Vec<&Finding> = report.findings_with(Severity::High).collect();

    if !critical.is_empty() {
        lines.push("### 🔴 Critical Issues".to_string());
        lines.push(String::new());
        lines.extend(critical.iter().take(MAX_DETAILED_ISSUES).map(|f| format_issue(f)));
    }
    if !high.is_empty() {
        lines.push("### 🟡 High Priority Issues".to_string());
        lines.push(String::new());
        lines.extend(high.iter().take(MAX_DETAILED_ISSUES).map(|f| format_issue(f)));
    }
    if critical.is_empty() && high.is_empty() {
        lines.push("✅ **No critical or high priority issues found!**".to_string());
    }
    lines.join("\n")
}

fn format_issue(finding: &Finding) -> String {
    let mut lines = vec![format!("#### {} - {}", finding.issue_type, finding.file)];
    if let Some(line) = finding.line.filter(|l| *l > 0) {
        lines.push(format!("**Location:** Line {}", line));
    }
    lines.push(format!(
        "**Severity:** {} {}",
        severity_icon(finding.severity),
        finding.severity.label()
    ));
    lines.push(format!("**Description:** {}", finding.description));

    if let Some(snippet) = &finding.code_snippet {
        lines.push("\n**Code:**".to_string());
        lines.push("```csharp".to_string());
        lines.push(snippet.clone());
        lines.push("```".to_string());
    }
    if let Some(recommendation) = &finding.recommendation {
        lines.push(format!("\n**Recommendation:** {}", recommendation));
    }
    lines.push("\n---\n".to_string());
    lines.join("\n")
}
