//! Audit pipeline
//!
//! Orchestrates a full audit of one project root:
//! 1. Scan for `.cs` / `.cshtml` files
//! 2. Classify every file by role
//! 3. Run the issue detectors and collect modernization opportunities
//! 4. Extract controller endpoints
//! 5. Run the database hotspot analysis (if enabled)
//! 6. Assemble the [`AuditReport`]
//!
//! Rendering and writing the report is left to the caller.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

use crate::architecture::infer_class_dependencies;
use crate::cache::FileCache;
use crate::classifier::classify_all;
use crate::config::ProjectConfig;
use crate::detectors::{
    collect_opportunities, default_detectors, DetectorEngineBuilder, ProgressCallback,
};
use crate::endpoints::extract_endpoints;
use crate::file_provider::{FileProvider, SourceFiles};
use crate::hotspots::{analyze_database_hotspots, DbHotspotReport, HotspotOptions};
use crate::models::{file_structure, AuditReport, FindingsSummary};
use crate::scanner;

/// Pipeline stages, numbered as they are shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Scan,
    Classify,
    Analyze,
    Endpoints,
    Hotspots,
    Report,
}

impl Step {
    pub const COUNT: usize = 6;

    pub fn number(self) -> usize {
        match self {
            Step::Scan => 1,
            Step::Classify => 2,
            Step::Analyze => 3,
            Step::Endpoints => 4,
            Step::Hotspots => 5,
            Step::Report => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Scan => "Scanning project files",
            Step::Classify => "Classifying files",
            Step::Analyze => "Analyzing code",
            Step::Endpoints => "Extracting endpoints",
            Step::Hotspots => "Running database hotspot mode",
            Step::Report => "Generating report",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Step::Scan => "📂",
            Step::Classify => "🏷️ ",
            Step::Analyze => "🔎",
            Step::Endpoints => "🌐",
            Step::Hotspots => "🧪",
            Step::Report => "📝",
        }
    }
}

/// What a finished step reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Scanned { files: usize },
    Classified { files: usize },
    Analyzed { files: usize, issues: usize },
    Endpoints { endpoints: usize },
    Hotspots { paths: usize, hotspots: usize, stored_procedures: usize },
}

/// Receives progress notifications while the pipeline runs.
///
/// Every method defaults to a no-op.
pub trait StepObserver {
    fn step_started(&mut self, _step: Step) {}
    fn step_finished(&mut self, _step: Step, _outcome: &StepOutcome) {}

    /// Callback handed to the detector engine during the analyze step.
    /// Called from worker threads with `(detector, done, total)`.
    fn detector_progress(&self) -> Option<ProgressCallback> {
        None
    }
}

/// Observer that ignores everything
pub struct Silent;

impl StepObserver for Silent {}

/// Full audit pipeline.
pub struct Pipeline {
    config: ProjectConfig,
    /// Run the database hotspot analysis
    hotspots: bool,
    /// Detector workers (0 = auto)
    workers: usize,
}

impl Pipeline {
    /// Create a pipeline. Hotspot mode starts as `config.hotspots.enabled`.
    pub fn new(config: ProjectConfig) -> Self {
        let hotspots = config.hotspots.enabled;
        let workers = config.defaults.workers.unwrap_or(0);
        Self {
            config,
            hotspots,
            workers,
        }
    }

    /// Force the hotspot analysis on or off.
    pub fn with_hotspots(mut self, enabled: bool) -> Self {
        self.hotspots = enabled;
        self
    }

    /// Set the number of detector workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn hotspots_enabled(&self) -> bool {
        self.hotspots
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Run the audit without progress notifications.
    pub fn run(&self, root: &Path) -> Result<AuditReport> {
        self.run_with_observer(root, &mut Silent)
    }

    /// Run the audit, notifying `observer` around each step.
    ///
    /// Step 6 (report) is left to the caller.
    pub fn run_with_observer(&self, root: &Path, observer: &mut dyn StepObserver) -> Result<AuditReport> {
        let root = scanner::validate_root(root)?;
        let cache = FileCache::new();

        observer.step_started(Step::Scan);
        let mut files = scanner::scan(&root, &self.config, &cache)?;
        let total_files = files.len();
        observer.step_finished(Step::Scan, &StepOutcome::Scanned { files: total_files });

        observer.step_started(Step::Classify);
        classify_all(&mut files, &cache);
        observer.step_finished(Step::Classify, &StepOutcome::Classified { files: files.len() });

        let provider = SourceFiles::new(files, root.clone(), cache);

        observer.step_started(Step::Analyze);
        let mut builder = DetectorEngineBuilder::new()
            .workers(self.workers)
            .detectors(default_detectors(&self.config));
        if let Some(callback) = observer.detector_progress() {
            builder = builder.on_progress(callback);
        }
        let engine = builder.build();
        debug!("Running detectors: {:?}", engine.detector_names());
        let findings = engine.run(&provider)?;
        let opportunities = collect_opportunities(&provider, &findings);
        let analyzed_files = provider.files().len();
        observer.step_finished(
            Step::Analyze,
            &StepOutcome::Analyzed {
                files: analyzed_files,
                issues: findings.len(),
            },
        );

        observer.step_started(Step::Endpoints);
        let endpoints = extract_endpoints(&provider);
        observer.step_finished(
            Step::Endpoints,
            &StepOutcome::Endpoints {
                endpoints: endpoints.len(),
            },
        );

        let class_dependencies = infer_class_dependencies(&provider);

        let database = if self.hotspots {
            observer.step_started(Step::Hotspots);
            let report = analyze_database_hotspots(
                &provider,
                &endpoints,
                HotspotOptions::from(&self.config.hotspots),
            );
            observer.step_finished(
                Step::Hotspots,
                &StepOutcome::Hotspots {
                    paths: report.call_graph.len(),
                    hotspots: report.hotspots.len(),
                    stored_procedures: report.stored_procedures.len(),
                },
            );
            report
        } else {
            DbHotspotReport::default()
        };

        let files = provider.into_files();
        let findings_summary = FindingsSummary::from_findings(&findings);

        info!(
            "Audit of {} finished: {} files, {} findings, {} endpoints",
            root.display(),
            total_files,
            findings.len(),
            endpoints.len()
        );

        Ok(AuditReport {
            project_path: root.display().to_string(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            total_files,
            analyzed_files,
            file_structure: file_structure(&files),
            files,
            endpoints,
            findings,
            findings_summary,
            opportunities,
            class_dependencies,
            database_hotspot_mode: self.hotspots,
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileRole;
    use std::fs;
    use std::sync::{Arc, Mutex};

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write");
    }

    fn sample_project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        write(
            dir.path(),
            "Controllers/OrdersController.cs",
            r#"public class OrdersController : Controller
{
    private readonly IOrderService _orders;

    public ActionResult Index()
    {
        return View(_orders.Recent());
    }
}
"#,
        );
        write(
            dir.path(),
            "Services/OrderService.cs",
            r#"public class OrderService : IOrderService
{
    private readonly IOrderRepository _repo;

    public List<Order> Recent()
    {
        var result = _repo.Load().Result;
        return result;
    }
}
"#,
        );
        write(
            dir.path(),
            "Data/OrderRepository.cs",
            r#"public class OrderRepository : IOrderRepository
{
    private readonly ShopContext _db;

    public List<Order> Load()
    {
        _db.SaveChanges();
        return _db.Orders.ToList();
    }
}
"#,
        );
        write(dir.path(), "bin/Debug/Generated.cs", "public class Ignored { }");
        dir
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<Step>,
        finished: Vec<StepOutcome>,
        detectors_done: Arc<Mutex<Vec<(usize, usize)>>>,
    }

    impl StepObserver for Recorder {
        fn step_started(&mut self, step: Step) {
            self.started.push(step);
        }

        fn step_finished(&mut self, _step: Step, outcome: &StepOutcome) {
            self.finished.push(outcome.clone());
        }

        fn detector_progress(&self) -> Option<ProgressCallback> {
            let done = Arc::clone(&self.detectors_done);
            Some(Box::new(move |_name, completed, total| {
                if let Ok(mut done) = done.lock() {
                    done.push((completed, total));
                }
            }))
        }
    }

    #[test]
    fn test_step_numbering() {
        assert_eq!(Step::Scan.number(), 1);
        assert_eq!(Step::Report.number(), Step::COUNT);
        assert_eq!(Step::Hotspots.label(), "Running database hotspot mode");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("nope");
        let err = Pipeline::new(ProjectConfig::default())
            .run(&missing)
            .expect_err("missing root");
        assert!(err.to_string().contains("Project path does not exist"));
    }

    #[test]
    fn test_pipeline_without_hotspots() {
        let dir = sample_project();
        let mut recorder = Recorder::default();
        let report = Pipeline::new(ProjectConfig::default())
            .with_workers(2)
            .run_with_observer(dir.path(), &mut recorder)
            .expect("audit");

        assert_eq!(report.total_files, 3);
        assert_eq!(report.analyzed_files, 3);
        assert_eq!(report.role_count(FileRole::Controller), 1);
        assert_eq!(report.role_count(FileRole::Service), 1);
        assert_eq!(report.role_count(FileRole::Repository), 1);
        assert_eq!(report.endpoints.len(), 1);
        assert_eq!(report.endpoints[0].route, "/Orders/Index");
        assert!(!report.database_hotspot_mode);
        assert!(report.database.call_graph.is_empty());
        assert!(report
            .findings
            .iter()
            .any(|f| f.detector == "SyncBlockingDetector"));
        assert_eq!(report.findings_summary.total, report.findings.len());

        assert_eq!(
            recorder.started,
            vec![Step::Scan, Step::Classify, Step::Analyze, Step::Endpoints]
        );
        assert_eq!(recorder.finished[0], StepOutcome::Scanned { files: 3 });

        let mut done = recorder.detectors_done.lock().expect("lock").clone();
        done.sort();
        let total = default_detectors(&ProjectConfig::default()).len();
        assert_eq!(done.len(), total);
        assert_eq!(done.last(), Some(&(total, total)));
    }

    #[test]
    fn test_pipeline_with_hotspots() {
        let dir = sample_project();
        let mut recorder = Recorder::default();
        let report = Pipeline::new(ProjectConfig::default())
            .with_hotspots(true)
            .run_with_observer(dir.path(), &mut recorder)
            .expect("audit");

        assert!(report.database_hotspot_mode);
        assert_eq!(report.database.call_graph.len(), 1);
        let profile = &report.database.call_graph[0];
        assert_eq!(profile.endpoint, "OrdersController.Index");
        assert_eq!(profile.total_db_touches, 2);
        assert_eq!(report.database.hotspots.len(), 1);
        assert!(recorder.started.contains(&Step::Hotspots));
    }

    #[test]
    fn test_config_enables_hotspots() {
        let mut config = ProjectConfig::default();
        config.hotspots.enabled = true;
        assert!(Pipeline::new(config.clone()).hotspots_enabled());
        assert!(!Pipeline::new(config).with_hotspots(false).hotspots_enabled());
    }
}
