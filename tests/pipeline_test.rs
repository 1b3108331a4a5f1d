//! Library-level audit tests over the fixture project
//!
//! `tests/fixtures/legacy_app` is a small MVC application:
//! `OrdersController -> IOrderService/OrderService -> IOrderRepository/OrderRepository`.

use legacy_auditor::config::ProjectConfig;
use legacy_auditor::models::{FileRole, Severity};
use legacy_auditor::reporters;
use legacy_auditor::{AuditError, Pipeline};
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/legacy_app")
}

#[test]
fn audits_fixture_without_hotspots() {
    let report = Pipeline::new(ProjectConfig::default())
        .run(&fixture())
        .expect("audit succeeds");

    assert_eq!(report.total_files, 6);
    assert_eq!(report.analyzed_files, 6);
    assert_eq!(report.role_count(FileRole::Controller), 1);
    assert_eq!(report.role_count(FileRole::Service), 2);
    assert_eq!(report.role_count(FileRole::Repository), 1);
    assert_eq!(report.role_count(FileRole::Model), 1);
    assert_eq!(report.role_count(FileRole::View), 1);

    let relative: Vec<&str> = report.files.iter().map(|f| f.relative_path.as_str()).collect();
    let mut sorted = relative.clone();
    sorted.sort();
    assert_eq!(relative, sorted);

    let routes: Vec<&str> = report.endpoints.iter().map(|e| e.route.as_str()).collect();
    assert_eq!(routes, vec!["/Orders/Index", "/Orders/Details", "/Orders/Export"]);

    assert!(!report.database_hotspot_mode);
    assert!(report.database.call_graph.is_empty());
}

#[test]
fn detects_known_issues_in_fixture() {
    let report = Pipeline::new(ProjectConfig::default())
        .run(&fixture())
        .expect("audit succeeds");

    assert!(report.findings.iter().any(|f| f.detector == "SyncBlockingDetector"
        && f.file == "Controllers/OrdersController.cs"
        && f.severity == Severity::Critical));
    assert!(report.findings.iter().any(|f| f.detector == "DatabaseInLoopDetector"
        && f.file == "Services/OrderService.cs"));
    assert!(report.findings.iter().any(|f| f.detector == "SyncIoDetector"
        && f.file == "Services/OrderService.cs"));

    // Most severe first
    let severities: Vec<Severity> = report.findings.iter().map(|f| f.severity).collect();
    let mut expected = severities.clone();
    expected.sort_by(|a, b| b.cmp(a));
    assert_eq!(severities, expected);

    assert_eq!(report.findings_summary.total, report.findings.len());
    assert!(report.findings_summary.critical >= 2);
}

#[test]
fn hotspot_mode_profiles_every_endpoint() {
    let report = Pipeline::new(ProjectConfig::default())
        .with_hotspots(true)
        .run(&fixture())
        .expect("audit succeeds");

    assert!(report.database_hotspot_mode);
    let db = &report.database;
    let endpoints: Vec<&str> = db.call_graph.iter().map(|p| p.endpoint.as_str()).collect();
    assert_eq!(
        endpoints,
        vec![
            "OrdersController.Index",
            "OrdersController.Details",
            "OrdersController.Export"
        ]
    );

    let index = &db.call_graph[0];
    assert_eq!(index.total_db_touches, 4);
    assert_eq!(
        index.chains,
        vec![
            "OrdersController.Index -> OrderService.GetRecentOrders -> OrderRepository.GetAll",
            "OrdersController.Index -> OrderService.GetRecentOrders -> OrderRepository.GetTotal",
        ]
    );
    assert!(index.services.contains("OrderService"));
    assert!(index.repositories.contains("OrderRepository"));

    let details = &db.call_graph[1];
    assert_eq!(details.total_db_touches, 1);

    let hotspots: Vec<&str> = db.hotspots.iter().map(|p| p.endpoint.as_str()).collect();
    assert_eq!(hotspots, vec!["OrdersController.Index"]);

    assert_eq!(db.stored_procedures, vec!["usp_GetOrderTotal", "usp_SearchOrders"]);
    assert_eq!(db.sql_fragments, vec!["EXEC dbo.usp_GetOrderTotal @OrderId"]);
}

#[test]
fn higher_threshold_filters_hotspots() {
    let mut config = ProjectConfig::default();
    config.hotspots.enabled = true;
    config.hotspots.threshold = 4;

    let report = Pipeline::new(config).run(&fixture()).expect("audit succeeds");
    assert_eq!(report.database.call_graph.len(), 3);
    assert!(report.database.hotspots.is_empty());
}

#[test]
fn excluded_paths_are_not_scanned() {
    let mut config = ProjectConfig::default();
    config.exclude.paths = vec!["Views/".to_string(), "*.Designer.cs".to_string()];
    config.exclude.dirs = vec!["Models".to_string()];

    let report = Pipeline::new(config).run(&fixture()).expect("audit succeeds");
    assert_eq!(report.total_files, 4);
    assert_eq!(report.role_count(FileRole::View), 0);
    assert_eq!(report.role_count(FileRole::Model), 0);
}

#[test]
fn markdown_report_for_fixture() {
    let report = Pipeline::new(ProjectConfig::default())
        .with_hotspots(true)
        .run(&fixture())
        .expect("audit succeeds");
    let markdown = reporters::report(&report, "markdown").expect("render");

    assert!(markdown.starts_with("# Legacy .NET Audit Report"));
    assert!(markdown.contains("/Orders/Index"));
    assert!(markdown.contains("usp_SearchOrders"));
    assert!(markdown.contains("OrdersController.Index -> OrderService.GetRecentOrders"));
}

#[test]
fn unreadable_or_empty_files_are_tolerated() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("Empty.cs"), "").expect("write");
    std::fs::write(dir.path().join("Binary.cs"), [0xff_u8, 0xfe, 0x00, 0x7b]).expect("write");

    let report = Pipeline::new(ProjectConfig::default())
        .with_hotspots(true)
        .run(dir.path())
        .expect("audit succeeds");
    assert_eq!(report.total_files, 2);
    assert!(report.endpoints.is_empty());
    assert!(report.database.call_graph.is_empty());
}

#[test]
fn invalid_roots_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing");
    let err = Pipeline::new(ProjectConfig::default())
        .run(&missing)
        .expect_err("missing root");
    assert!(matches!(
        err.downcast_ref::<AuditError>(),
        Some(AuditError::PathNotFound(_))
    ));

    let file = dir.path().join("file.cs");
    std::fs::write(&file, "class A {}").expect("write");
    let err = Pipeline::new(ProjectConfig::default())
        .run(&file)
        .expect_err("file root");
    assert!(matches!(
        err.downcast_ref::<AuditError>(),
        Some(AuditError::NotADirectory(_))
    ));
}
