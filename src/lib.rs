//! Qatrace - A QA checklist tracking library.
//!
//! This library provides the core functionality for the `qat` CLI tool:
//! merging feature checklists from a static catalog, tracking test sessions
//! item by item, and rendering traceability reports.

pub mod catalog;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod report;
pub mod server;
pub mod store;

/// Version string reported by the CLI and the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit the binary was built from.
pub const GIT_COMMIT: &str = env!("QAT_GIT_COMMIT");

/// UTC time the binary was built.
pub const BUILD_TIMESTAMP: &str = env!("QAT_BUILD_TIMESTAMP");

/// Library-level error type for Qatrace operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required input was empty or malformed.
    #[error("{0}")]
    Validation(String),

    /// Unknown session or checklist item.
    #[error("{0}")]
    NotFound(String),

    /// The checklist catalog is not well-formed.
    #[error("Catalog parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    /// A document or workbook renderer failed.
    #[error("Export error: {0}")]
    Export(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Qatrace operations.
pub type Result<T> = std::result::Result<T, Error>;
