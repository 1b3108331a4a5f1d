//! CLI definition and entry point

mod analyze;

use crate::error::AuditError;
use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Legacy .NET Auditor - analyze ASP.NET projects for modernization
#[derive(Parser, Debug)]
#[command(name = "legacy-auditor")]
#[command(
    version = "1.0.0",
    about = "Legacy .NET Auditor - Analyze ASP.NET projects for modernization",
    long_about = "Static audit of legacy ASP.NET / C# projects. Classifies files, flags \
performance risks (database calls in loops, N+1 queries, blocking waits, sequential HTTP \
calls), maps controller endpoints and writes a Markdown modernization report.\n\n\
Nothing is compiled or executed; all analysis is lexical.",
    after_help = "\
Examples:
  legacy-auditor /path/to/dotnet/project
  legacy-auditor /path/to/dotnet/project -o custom-report.md
  legacy-auditor . --output reports/my-audit.md
  legacy-auditor . --database-hotspot-mode
  legacy-auditor . --format json -o reports/audit.json"
)]
pub struct Cli {
    /// Path to the .NET project root directory
    pub path: PathBuf,

    /// Output path for the report [default: reports/audit.md]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format (markdown, json, text) [default: markdown]
    #[arg(short, long, value_parser = ["markdown", "md", "json", "text", "txt"])]
    pub format: Option<String>,

    /// Enable best-effort DB hotspot analysis: controller->service->repository call graph,
    /// multi-touch endpoint flags, and stored procedure/SQL fragment extraction
    #[arg(long)]
    pub database_hotspot_mode: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel detector workers (1-64) [default: all cores]
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,
}

/// Run the audit described by the parsed arguments.
pub fn run(cli: Cli) -> Result<()> {
    analyze::run(analyze::AuditArgs {
        path: cli.path,
        output: cli.output,
        format: cli.format,
        database_hotspot_mode: cli.database_hotspot_mode,
        workers: cli.workers,
    })
}

/// Print a top-level failure to stderr.
///
/// Invalid project paths get the short form; anything else is reported as
/// an audit failure with its full context chain.
pub fn print_error(err: &anyhow::Error) {
    match err.downcast_ref::<AuditError>() {
        Some(e @ (AuditError::PathNotFound(_) | AuditError::NotADirectory(_))) => {
            eprintln!("{}Error: {}", style("❌ ").red(), e);
        }
        _ => {
            eprintln!("\n{}Error during audit: {:#}", style("❌ ").red(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4"), Ok(4));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["legacy-auditor", "."]).expect("parse");
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.output.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.database_hotspot_mode);
        assert_eq!(cli.log_level, "warn");
        assert!(cli.workers.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "legacy-auditor",
            "/src/shop",
            "-o",
            "out/report.json",
            "-f",
            "json",
            "--database-hotspot-mode",
            "--log-level",
            "debug",
            "--workers",
            "2",
        ])
        .expect("parse");
        assert_eq!(cli.output, Some(PathBuf::from("out/report.json")));
        assert_eq!(cli.format.as_deref(), Some("json"));
        assert!(cli.database_hotspot_mode);
        assert_eq!(cli.workers, Some(2));
    }

    #[test]
    fn test_path_is_required() {
        assert!(Cli::try_parse_from(["legacy-auditor"]).is_err());
    }

    #[test]
    fn test_path_errors_downcast() {
        let err: anyhow::Error = AuditError::PathNotFound(PathBuf::from("/nope")).into();
        assert!(matches!(
            err.downcast_ref::<AuditError>(),
            Some(AuditError::PathNotFound(_))
        ));
    }
}
