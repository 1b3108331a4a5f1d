//! Database hotspot analysis
//!
//! Heuristic, compiler-free inference of how much database work sits behind
//! each controller action:
//!
//! 1. [`HotspotIndex`] indexes classes, typed fields and method bodies of every
//!    C# file, scores each body with [`count_db_touches`] and resolves
//!    `_field.Method(` calls through [`InterfaceResolver`].
//! 2. [`EndpointAggregator`] walks controller -> service -> repository for
//!    every endpoint and produces an [`EndpointDbProfile`].
//! 3. [`SqlArtifacts`] collects stored procedure names and SQL fragments from
//!    decoded string literals.
//!
//! The call graph is neither sound nor complete. Calls through locals,
//! statics or non-underscore fields are invisible.

pub mod aggregator;
pub mod braces;
pub mod call_graph;
pub mod db_touch;
pub mod index;
pub mod interfaces;
pub mod layers;
pub mod source_index;
pub mod sql_artifacts;

pub use aggregator::{select_hotspots, EndpointAggregator, EndpointDbProfile};
pub use braces::{find_matching_brace, BraceScan};
pub use call_graph::{extract_member_calls, CallEdge};
pub use db_touch::count_db_touches;
pub use index::{ClassRecord, HotspotIndex, MethodRecord};
pub use interfaces::InterfaceResolver;
pub use layers::{LayerTagger, NamingConventionTagger};
pub use source_index::SourceIndex;
pub use sql_artifacts::SqlArtifacts;

use crate::config::HotspotConfig;
use crate::file_provider::FileProvider;
use crate::models::Endpoint;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Knobs for one hotspot run
#[derive(Debug, Clone, Copy)]
pub struct HotspotOptions {
    /// An endpoint is a hotspot when its total exceeds this value
    pub threshold: usize,
    pub brace_scan: BraceScan,
}

impl Default for HotspotOptions {
    fn default() -> Self {
        Self {
            threshold: 1,
            brace_scan: BraceScan::Naive,
        }
    }
}

impl From<&HotspotConfig> for HotspotOptions {
    fn from(config: &HotspotConfig) -> Self {
        Self {
            threshold: config.threshold,
            brace_scan: config.brace_scan,
        }
    }
}

/// Everything the hotspot analysis hands to the reporters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbHotspotReport {
    /// Threshold the hotspots were selected with
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// One profile per endpoint, in endpoint order
    pub call_graph: Vec<EndpointDbProfile>,
    /// Profiles above the threshold, highest total first
    pub hotspots: Vec<EndpointDbProfile>,
    pub stored_procedures: Vec<String>,
    pub sql_fragments: Vec<String>,
}

fn default_threshold() -> usize {
    HotspotOptions::default().threshold
}

impl Default for DbHotspotReport {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            call_graph: Vec::new(),
            hotspots: Vec::new(),
            stored_procedures: Vec::new(),
            sql_fragments: Vec::new(),
        }
    }
}

/// Run the analysis with the naming-convention layer rules.
pub fn analyze_database_hotspots(
    provider: &dyn FileProvider,
    endpoints: &[Endpoint],
    options: HotspotOptions,
) -> DbHotspotReport {
    analyze_with_tagger(provider, endpoints, options, &NamingConventionTagger)
}

/// Run the analysis with custom layer rules.
pub fn analyze_with_tagger(
    provider: &dyn FileProvider,
    endpoints: &[Endpoint],
    options: HotspotOptions,
    tagger: &dyn LayerTagger,
) -> DbHotspotReport {
    let index = HotspotIndex::build(provider, options.brace_scan);

    let mut sql = SqlArtifacts::default();
    for file in provider.files().iter().filter(|f| f.is_csharp()) {
        let content = provider.content(file.path());
        if content.is_empty() {
            continue;
        }
        sql.merge(SqlArtifacts::collect_from(&content));
    }

    let call_graph = EndpointAggregator::new(&index, tagger).profile_all(endpoints);
    let hotspots = select_hotspots(&call_graph, options.threshold);

    info!(
        "Database hotspots: {} of {} endpoints, {} stored procedures, {} SQL fragments",
        hotspots.len(),
        call_graph.len(),
        sql.stored_procedures.len(),
        sql.sql_fragments.len()
    );

    DbHotspotReport {
        threshold: options.threshold,
        call_graph,
        hotspots,
        stored_procedures: sql.stored_procedures.into_iter().collect(),
        sql_fragments: sql.sql_fragments.into_iter().collect(),
    }
}
