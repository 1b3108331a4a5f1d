//! Issue detectors
//!
//! This module provides the detector framework and the C# modernization
//! detectors that run over the classified source files.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DetectorEngine                          │
//! │  - Registers detectors                                      │
//! │  - Runs detectors in parallel (rayon)                       │
//! │  - Isolates detector errors and panics                      │
//! │  - Collects findings, sorted by severity                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Detector Trait                         │
//! │  - name(): Unique identifier                                │
//! │  - description(): Human-readable description                │
//! │  - detect(files): Run detection, return findings            │
//! │  - is_cross_file(): Whether findings span several files     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Detectors
//!
//! ## Per-file
//! - `LargeFileDetector` - Files over the line thresholds (any extension)
//! - `DatabaseInLoopDetector` - Data access inside `for`/`foreach`/`while`
//! - `NPlusOneDetector` - Navigation properties walked in a loop
//! - `SyncBlockingDetector` - `.Result`, `.Wait()`, `.GetAwaiter().GetResult()`
//! - `SequentialHttpDetector` - Awaited HTTP calls one after another
//! - `SyncIoDetector` - Blocking file/stream/HTTP/ADO.NET calls
//!
//! ## Cross-file
//! - `DuplicatePatternDetector` - Repeated signatures and repository methods
//!
//! # Usage
//!
//! ```ignore
//! use legacy_auditor::detectors::{default_detectors, DetectorEngineBuilder};
//!
//! let engine = DetectorEngineBuilder::new()
//!     .workers(4)
//!     .detectors(default_detectors(&config))
//!     .build();
//!
//! let findings = engine.run(&files)?;
//! ```

mod base;
mod db_in_loop;
mod duplicate_patterns;
mod engine;
mod large_files;
mod n_plus_one;
mod opportunities;
mod sequential_http;
mod sync_blocking;
mod sync_io;

pub use base::{code_snippet, DetectionSummary, Detector, DetectorResult, ProgressCallback};
pub use db_in_loop::DatabaseInLoopDetector;
pub use duplicate_patterns::{method_signatures, DuplicatePatternDetector};
pub use engine::{DetectorEngine, DetectorEngineBuilder};
pub use large_files::LargeFileDetector;
pub use n_plus_one::NPlusOneDetector;
pub use opportunities::{
    async_opportunity, collect_opportunities, queue_candidates, signalr_opportunities,
};
pub use sequential_http::SequentialHttpDetector;
pub use sync_blocking::SyncBlockingDetector;
pub use sync_io::SyncIoDetector;

use crate::config::ProjectConfig;
use std::sync::Arc;
use tracing::debug;

/// Every built-in detector, configured from the project thresholds.
///
/// Detectors disabled under `[detectors.<name>]` are left out. Order here
/// is the tie-break order for findings of equal severity.
pub fn default_detectors(config: &ProjectConfig) -> Vec<Arc<dyn Detector>> {
    let all: Vec<Arc<dyn Detector>> = vec![
        Arc::new(LargeFileDetector::from_thresholds(&config.thresholds)),
        Arc::new(DatabaseInLoopDetector),
        Arc::new(NPlusOneDetector),
        Arc::new(SyncBlockingDetector),
        Arc::new(SequentialHttpDetector::from_thresholds(&config.thresholds)),
        Arc::new(SyncIoDetector),
        Arc::new(DuplicatePatternDetector),
    ];

    all.into_iter()
        .filter(|d| {
            let enabled = config.is_detector_enabled(d.name());
            if !enabled {
                debug!("Detector {} disabled by config", d.name());
            }
            enabled
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_provider::MockFileProvider;
    use crate::models::Severity;

    #[test]
    fn test_default_detectors_respect_config() {
        let all = default_detectors(&ProjectConfig::default());
        assert_eq!(all.len(), 7);
        assert_eq!(all.iter().filter(|d| d.is_cross_file()).count(), 1);

        let config: ProjectConfig = toml::from_str(
            "[detectors.sync-io]\nenabled = false\n[detectors.large-file]\nenabled = false\n",
        )
        .expect("valid toml");
        let names: Vec<&str> = default_detectors(&config).iter().map(|d| d.name()).collect();
        assert!(!names.contains(&"SyncIoDetector"));
        assert!(!names.contains(&"LargeFileDetector"));
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_engine_over_default_detectors() {
        let source = "\
public class FeedController : Controller
{
    public ActionResult Index()
    {
        var feed = _client.GetFeedAsync().Result;
        foreach (var id in ids)
        {
            var item = _db.Items.Find(id);
        }
        return View(feed);
    }
}
";
        let provider = MockFileProvider::new(vec![("Controllers/FeedController.cs", source)]);
        let engine = DetectorEngineBuilder::new()
            .workers(2)
            .detectors(default_detectors(&ProjectConfig::default()))
            .build();

        let findings = engine.run(&provider).expect("detection runs");
        let got: Vec<(&str, Severity)> = findings
            .iter()
            .map(|f| (f.detector.as_str(), f.severity))
            .collect();
        // Equal severity keeps registration order
        assert_eq!(
            got,
            vec![
                ("DatabaseInLoopDetector", Severity::Critical),
                ("SyncBlockingDetector", Severity::Critical),
                ("NPlusOneDetector", Severity::High),
            ]
        );
    }
}
