//! Command implementations for the qat CLI.
//!
//! Each command returns a result type implementing [`Output`], so `main` can
//! print it as JSON (default) or as human-readable text (`-H`).
//! - `catalog` - offline catalog listing, merge and validation
//! - `session` - drive sessions on a running server
//! - `report` - build and export traceability reports
//! - `config` - show resolved configuration

mod catalog;
mod config;
mod report;
mod session;

pub use catalog::{
    CatalogCheck, FeatureCount, FeatureList, MergeResult, catalog_check, catalog_features,
    catalog_merge,
};
pub use config::{ConfigShow, config_show};
pub use report::{ReportOptions, ReportOutput, ReportSource, report};
pub use session::{
    ItemMarked, SessionCreated, SessionShow, session_create, session_features, session_mark,
    session_show,
};

use serde::Serialize;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Compact JSON for a serializable result.
fn json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Left-aligned columns, widths taken from the widest cell.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", cell, width = width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(headers.to_vec())];
    for row in rows {
        lines.push(line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let out = table(
            &["ID", "Text"],
            &[
                vec!["C1".to_string(), "Add item".to_string()],
                vec!["LONG-ID".to_string(), "x".to_string()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID       Text");
        assert_eq!(lines[1], "C1       Add item");
        assert_eq!(lines[2], "LONG-ID  x");
    }
}
