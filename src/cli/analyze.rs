//! Audit command: run the pipeline with console progress and write the report

use crate::config::{load_project_config, ProjectConfig};
use crate::detectors::ProgressCallback;
use crate::models::AuditReport;
use crate::pipeline::{Pipeline, Step, StepObserver, StepOutcome};
use crate::reporters::{self, OutputFormat};
use crate::scanner;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_OUTPUT: &str = "reports/audit.md";

/// Arguments of one audit run, after clap parsing
#[derive(Debug, Clone)]
pub struct AuditArgs {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub database_hotspot_mode: bool,
    pub workers: Option<usize>,
}

/// Effective settings: CLI flags over project config over built-in defaults
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    output: PathBuf,
    format: OutputFormat,
    hotspots: bool,
    workers: usize,
}

impl Settings {
    fn resolve(args: &AuditArgs, config: &ProjectConfig) -> Result<Self> {
        let format = match args.format.as_deref().or(config.defaults.format.as_deref()) {
            Some(f) => OutputFormat::from_str(f)?,
            None => OutputFormat::default(),
        };

        let output = match (&args.output, &config.defaults.output) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => path.clone(),
            (None, None) => {
                PathBuf::from(DEFAULT_OUTPUT).with_extension(reporters::file_extension(format))
            }
        };

        Ok(Self {
            output,
            format,
            hotspots: args.database_hotspot_mode || config.hotspots.enabled,
            workers: args.workers.or(config.defaults.workers).unwrap_or(0),
        })
    }
}

pub fn run(args: AuditArgs) -> Result<()> {
    let start = Instant::now();
    let root = scanner::validate_root(&args.path)?;
    let config = load_project_config(&root);
    let settings = Settings::resolve(&args, &config)?;
    debug!("Effective settings: {:?}", settings);

    print_header(&args.path);

    let pipeline = Pipeline::new(config)
        .with_hotspots(settings.hotspots)
        .with_workers(settings.workers);
    let mut progress = ConsoleProgress::default();
    let report = pipeline.run_with_observer(&root, &mut progress)?;

    print_step(Step::Report);
    let rendered = reporters::report_with_format(&report, settings.format)?;
    write_report(&settings.output, &rendered)?;
    println!("   Report saved to: {}", style(settings.output.display()).cyan());

    if settings.format == OutputFormat::Text {
        println!("\n{}", rendered);
    }

    print_summary(&report, &settings.output);
    debug!("Audit finished in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Write the rendered report, creating parent directories as needed
fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Step lines and spinners on stdout
#[derive(Default)]
struct ConsoleProgress {
    spinner: Option<ProgressBar>,
}

impl StepObserver for ConsoleProgress {
    fn step_started(&mut self, step: Step) {
        print_step(step);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(create_spinner_style());
        spinner.set_message(format!("{}...", step.label()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn step_finished(&mut self, _step: Step, outcome: &StepOutcome) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        for line in outcome_lines(outcome) {
            println!("   {}", line);
        }
    }

    fn detector_progress(&self) -> Option<ProgressCallback> {
        let spinner = self.spinner.clone()?;
        Some(Box::new(move |name, done, total| {
            spinner.set_message(detector_message(name, done, total));
        }))
    }
}

fn detector_message(name: &str, done: usize, total: usize) -> String {
    format!("{}... {}/{} detectors ({})", Step::Analyze.label(), done, total, name)
}

fn outcome_lines(outcome: &StepOutcome) -> Vec<String> {
    match *outcome {
        StepOutcome::Scanned { files } => vec![format!("Found {} files", style(files).cyan())],
        StepOutcome::Classified { files } => {
            vec![format!("Classified {} files", style(files).cyan())]
        }
        StepOutcome::Analyzed { files, issues } => vec![
            format!("Analyzed {} files", style(files).cyan()),
            format!("Found {} issues", style(issues).cyan()),
        ],
        StepOutcome::Endpoints { endpoints } => {
            vec![format!("Found {} endpoints", style(endpoints).cyan())]
        }
        StepOutcome::Hotspots {
            paths,
            hotspots,
            stored_procedures,
        } => vec![
            format!("Built {} endpoint DB call paths", style(paths).cyan()),
            format!("Hotspots (multi-touch endpoints): {}", style(hotspots).cyan()),
            format!("Stored procedures referenced: {}", style(stored_procedures).cyan()),
        ],
    }
}

fn print_step(step: Step) {
    println!(
        "{} Step {}/{}: {}...",
        step.icon(),
        step.number(),
        Step::COUNT,
        style(step.label()).bold()
    );
}

fn print_header(path: &Path) {
    println!("{}Legacy .NET Auditor", style("🔍 ").bold());
    println!("{}", style("=".repeat(60)).dim());
    println!("Project: {}", style(path.display()).cyan());
    println!();
}

fn print_summary(report: &AuditReport, output: &Path) {
    let summary = &report.findings_summary;
    println!("\n{}", style("=".repeat(60)).dim());
    println!("{}Summary:", style("📊 ").bold());
    println!("   Total Issues: {}", style(summary.total).cyan());
    println!("   Critical: {}", style(summary.critical).red().bold());
    println!("   High: {}", style(summary.high).yellow());
    if report.database_hotspot_mode {
        println!("   DB Hotspots: {}", style(report.database.hotspots.len()).cyan());
    }
    println!(
        "\n{}Audit complete! Report: {}",
        style("✅ ").green(),
        style(output.display()).cyan()
    );
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("   {spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliDefaults;

    fn args() -> AuditArgs {
        AuditArgs {
            path: PathBuf::from("."),
            output: None,
            format: None,
            database_hotspot_mode: false,
            workers: None,
        }
    }

    #[test]
    fn test_builtin_defaults() {
        let settings = Settings::resolve(&args(), &ProjectConfig::default()).expect("settings");
        assert_eq!(settings.output, PathBuf::from("reports/audit.md"));
        assert_eq!(settings.format, OutputFormat::Markdown);
        assert!(!settings.hotspots);
        assert_eq!(settings.workers, 0);
    }

    #[test]
    fn test_default_output_follows_format() {
        let mut a = args();
        a.format = Some("json".to_string());
        let settings = Settings::resolve(&a, &ProjectConfig::default()).expect("settings");
        assert_eq!(settings.output, PathBuf::from("reports/audit.json"));
    }

    #[test]
    fn test_config_over_defaults_and_cli_over_config() {
        let mut config = ProjectConfig::default();
        config.hotspots.enabled = true;
        config.defaults = CliDefaults {
            output: Some(PathBuf::from("docs/audit.md")),
            format: Some("text".to_string()),
            workers: Some(3),
        };

        let from_config = Settings::resolve(&args(), &config).expect("settings");
        assert_eq!(from_config.output, PathBuf::from("docs/audit.md"));
        assert_eq!(from_config.format, OutputFormat::Text);
        assert!(from_config.hotspots);
        assert_eq!(from_config.workers, 3);

        let mut a = args();
        a.output = Some(PathBuf::from("x.md"));
        a.format = Some("markdown".to_string());
        a.workers = Some(1);
        let from_cli = Settings::resolve(&a, &config).expect("settings");
        assert_eq!(from_cli.output, PathBuf::from("x.md"));
        assert_eq!(from_cli.format, OutputFormat::Markdown);
        assert_eq!(from_cli.workers, 1);
    }

    #[test]
    fn test_unknown_config_format_is_an_error() {
        let mut config = ProjectConfig::default();
        config.defaults.format = Some("pdf".to_string());
        assert!(Settings::resolve(&args(), &config).is_err());
    }

    #[test]
    fn test_write_report_creates_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/deeper/audit.md");
        write_report(&path, "# Report").expect("write");
        assert_eq!(std::fs::read_to_string(path).expect("read"), "# Report");
    }

    #[test]
    fn test_hotspot_outcome_lines() {
        console::set_colors_enabled(false);
        let lines = outcome_lines(&StepOutcome::Hotspots {
            paths: 4,
            hotspots: 2,
            stored_procedures: 1,
        });
        assert_eq!(
            lines,
            vec![
                "Built 4 endpoint DB call paths",
                "Hotspots (multi-touch endpoints): 2",
                "Stored procedures referenced: 1",
            ]
        );
    }

    #[test]
    fn test_detector_progress_updates_analyze_spinner() {
        let mut progress = ConsoleProgress::default();
        assert!(progress.detector_progress().is_none());

        progress.step_started(Step::Analyze);
        let callback = progress.detector_progress().expect("spinner running");
        callback("SyncBlockingDetector", 3, 7);

        let spinner = progress.spinner.as_ref().expect("spinner");
        assert_eq!(
            spinner.message(),
            "Analyzing code... 3/7 detectors (SyncBlockingDetector)"
        );
        progress.step_finished(Step::Analyze, &StepOutcome::Analyzed { files: 0, issues: 0 });
        assert!(progress.spinner.is_none());
    }
}
