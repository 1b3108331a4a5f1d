//! Configuration module for the legacy auditor
//!
//! This module handles:
//! - Project-level configuration (legacy-auditor.toml)
//! - Detector enable/disable switches
//! - Threshold overrides for the file-level detectors
//! - Database hotspot options and CLI defaults

mod project_config;

pub use project_config::{
    load_project_config, normalize_detector_name, CliDefaults, DetectorConfigOverride,
    ExcludeConfig, HotspotConfig, ProjectConfig, ThresholdConfig,
};
