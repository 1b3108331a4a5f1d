//! Legacy .NET Auditor
//!
//! Static, compiler-free audit of legacy ASP.NET / C# code bases: file
//! classification, issue detection, endpoint mapping, database hotspot
//! inference and Markdown/JSON/terminal reporting.
//!
//! The [`pipeline::Pipeline`] runs every stage and returns an
//! [`models::AuditReport`]; [`reporters`] render it.

pub mod architecture;
pub mod cache;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod endpoints;
pub mod error;
pub mod file_provider;
pub mod hotspots;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scanner;

pub use error::{AuditError, AuditResult};
pub use pipeline::Pipeline;
