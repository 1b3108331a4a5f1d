//! Modernization opportunities
//!
//! Not findings: notes on where async/await, SignalR or a background queue
//! would pay off. Collected after detection because queue candidates are
//! read from the finding descriptions.

use crate::detectors::sequential_http::is_http_call;
use crate::detectors::sync_io::is_sync_io;
use crate::file_provider::FileProvider;
use crate::models::{Finding, Opportunities, SourceFile};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Description keywords that mark work better done off the request path
const QUEUE_KEYWORDS: &[&str] = &["email", "notification", "report", "export", "import", "background"];

static REALTIME_INDICATORS: OnceLock<Vec<Regex>> = OnceLock::new();

fn realtime_indicators() -> &'static [Regex] {
    REALTIME_INDICATORS.get_or_init(|| {
        [
            r"Timer\(",
            r"polling",
            r"setInterval",
            r"while\s*\(true\)",
            r"Thread\.Sleep",
            r"Task\.Delay.*while",
            r"GetLatest",
            r"GetUpdates",
            r"CheckStatus",
            r"RefreshData",
        ]
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
        .collect()
    })
}

/// Gather all three opportunity lists for the audited files.
pub fn collect_opportunities(files: &dyn FileProvider, findings: &[Finding]) -> Opportunities {
    let mut opportunities = Opportunities::default();

    for file in files.csharp_files() {
        let content = files.content(file.path());
        if let Some(note) = async_opportunity(file, &content) {
            opportunities.async_await.push(note);
        }
        let lines = files.lines(file.path());
        opportunities
            .signalr
            .extend(signalr_opportunities(&file.relative_path, &lines));
    }

    opportunities.queue = queue_candidates(findings);
    opportunities
}

/// A file with no async usage that still does I/O, database or HTTP work
pub fn async_opportunity(file: &SourceFile, content: &str) -> Option<String> {
    if file.has_async {
        return None;
    }

    let mut operations = Vec::new();
    if is_sync_io(content) {
        operations.push("file I/O");
    }
    if file.has_entity_framework || file.has_sql {
        operations.push("database operations");
    }
    if is_http_call(content) {
        operations.push("HTTP calls");
    }

    if operations.is_empty() {
        return None;
    }
    Some(format!(
        "{}: No async/await usage found despite {}",
        file.relative_path,
        operations.join(", ")
    ))
}

/// One note per line that polls or sleeps
pub fn signalr_opportunities(relative_path: &str, lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| realtime_indicators().iter().any(|re| re.is_match(line)))
        .map(|(idx, _)| {
            format!(
                "{}:{} - Potential real-time use case (polling/timer detected)",
                relative_path,
                idx + 1
            )
        })
        .collect()
}

/// Files whose findings mention long-running work, sorted and deduplicated.
/// Cross-file findings contribute every file they list.
pub fn queue_candidates(findings: &[Finding]) -> Vec<String> {
    let candidates: BTreeSet<&str> = findings
        .iter()
        .filter(|f| {
            let description = f.description.to_lowercase();
            QUEUE_KEYWORDS.iter().any(|k| description.contains(k))
        })
        .flat_map(|f| f.file.split(", "))
        .collect();

    candidates.into_iter().map(String::from).collect()
}
