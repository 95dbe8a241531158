use super::Output;
use crate::client::ApiClient;
use crate::models::ChecklistItem;
use crate::report::{ExportFormat, Report, ReportFilter, ReportSort, default_file_name};
use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where report items come from.
#[derive(Debug, Clone)]
pub enum ReportSource {
    /// Fetch a live session from the server
    Session(String),
    /// Read a saved item list or session response
    Input(PathBuf),
}

/// Filter, sort and destination for a report.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub filter: ReportFilter,
    pub sort: Option<ReportSort>,
    pub format: ExportFormat,
    pub output: Option<PathBuf>,
    /// Write to the default `QA_Report_<session>.<ext>` file name
    pub save: bool,
}

/// A rendered report, either for stdout or already written to a file.
pub struct ReportOutput {
    pub content: Vec<u8>,
    pub written: Option<PathBuf>,
    pub rows: usize,
    pub extension: &'static str,
}

impl ReportOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).trim_end().to_string()
    }
}

impl Output for ReportOutput {
    /// JSON reports print as-is; other text formats are wrapped so stdout
    /// stays a single JSON document.
    fn to_json(&self) -> String {
        match &self.written {
            Some(path) => serde_json::json!({
                "written": path,
                "format": self.extension,
                "rows": self.rows,
            })
            .to_string(),
            None if self.extension == "json" => self.text(),
            None => serde_json::json!({
                "format": self.extension,
                "rows": self.rows,
                "content": String::from_utf8_lossy(&self.content),
            })
            .to_string(),
        }
    }

    fn to_human(&self) -> String {
        match &self.written {
            Some(path) => format!("Wrote {} row(s) to {}", self.rows, path.display()),
            None => self.text(),
        }
    }
}

/// Saved item files hold either a bare item array or a session response.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedItems {
    Items(Vec<ChecklistItem>),
    #[serde(rename_all = "camelCase")]
    Session { test_data: Vec<ChecklistItem> },
}

fn read_items(path: &Path) -> Result<Vec<ChecklistItem>> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Other(format!("cannot read report input {}: {}", path.display(), e))
    })?;
    let saved: SavedItems = serde_json::from_str(&content).map_err(|e| {
        Error::Validation(format!(
            "{} is not a checklist item list: {}",
            path.display(),
            e
        ))
    })?;
    Ok(match saved {
        SavedItems::Items(items) => items,
        SavedItems::Session { test_data } => test_data,
    })
}

pub fn report(
    client: &ApiClient,
    source: &ReportSource,
    options: &ReportOptions,
) -> Result<ReportOutput> {
    let renderer = options.format.renderer();
    if renderer.is_binary() && options.output.is_none() && !options.save {
        return Err(Error::Validation(format!(
            "{} reports are binary; write them with --output or --save",
            renderer.extension()
        )));
    }

    let (session_id, items) = match source {
        ReportSource::Session(id) => (Some(id.as_str()), client.fetch_session(id)?),
        ReportSource::Input(path) => (None, read_items(path)?),
    };

    let report = Report::build(session_id, &items, &options.filter, options.sort);
    let content = renderer.render(&report)?;

    let destination = match (&options.output, options.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(default_file_name(
            session_id,
            renderer.as_ref(),
        ))),
        (None, false) => None,
    };
    if let Some(path) = &destination {
        fs::write(path, &content)?;
        tracing::info!(path = %path.display(), rows = report.rows.len(), "report written");
    }

    Ok(ReportOutput {
        content,
        written: destination,
        rows: report.rows.len(),
        extension: renderer.extension(),
    })
}
