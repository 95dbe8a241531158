//! Traceability reports over a session's checklist items.
//!
//! A report is a read-only view: it aggregates pass/fail/pending counts,
//! groups items by feature, applies filter and sort options, and hands a
//! fixed set of columns to the export renderers in [`export`].

pub mod export;

pub use export::{
    CsvRenderer, ExportFormat, JsonRenderer, ReportRenderer, TextRenderer, default_file_name,
};

use crate::models::{ChecklistItem, ItemStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Column headers shared by every export, in order.
pub const COLUMNS: [&str; 5] = ["Feature", "Checklist ID", "Description", "Bug ID", "Status"];

/// Round a percentage to one decimal place.
fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((count as f64 / total as f64) * 1000.0).round() / 10.0
}

/// Pass/fail/pending counts and percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub pass_percent: f64,
    pub fail_percent: f64,
    pub pending_percent: f64,
}

impl ReportSummary {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a ChecklistItem>) -> Self {
        let mut summary = Self::default();
        for item in items {
            summary.total += 1;
            match item.status {
                ItemStatus::Pass => summary.passed += 1,
                ItemStatus::Failed => summary.failed += 1,
                ItemStatus::Pending => summary.pending += 1,
            }
        }
        summary.pass_percent = percent(summary.passed, summary.total);
        summary.fail_percent = percent(summary.failed, summary.total);
        summary.pending_percent = percent(summary.pending, summary.total);
        summary
    }

    pub fn count(&self, status: ItemStatus) -> usize {
        match status {
            ItemStatus::Pass => self.passed,
            ItemStatus::Failed => self.failed,
            ItemStatus::Pending => self.pending,
        }
    }
}

/// Items of one feature, with that feature's own summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureGroup {
    pub feature: String,
    pub summary: ReportSummary,
    pub items: Vec<ChecklistItem>,
}

/// Group items by feature, in order of each feature's first appearance.
pub fn group_by_feature(items: &[ChecklistItem]) -> Vec<FeatureGroup> {
    let mut groups: Vec<FeatureGroup> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.feature == item.feature) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(FeatureGroup {
                feature: item.feature.clone(),
                summary: ReportSummary::default(),
                items: vec![item.clone()],
            }),
        }
    }
    for group in &mut groups {
        group.summary = ReportSummary::from_items(&group.items);
    }
    groups
}

/// Which items a report view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub status: Option<ItemStatus>,
    pub feature: Option<String>,
    /// Case-insensitive substring matched against id, text and bug id
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, item: &ChecklistItem) -> bool {
        if self.status.is_some_and(|status| item.status != status) {
            return false;
        }
        if let Some(feature) = &self.feature {
            if &item.feature != feature {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = item.id.to_lowercase().contains(&needle)
                || item.text.to_lowercase().contains(&needle)
                || item.bug_display().to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Column a report view is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Feature,
    Text,
    Bug,
    Status,
}

impl SortKey {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "id" => Some(SortKey::Id),
            "feature" => Some(SortKey::Feature),
            "text" | "description" => Some(SortKey::Text),
            "bug" | "bug-id" | "bugid" => Some(SortKey::Bug),
            "status" => Some(SortKey::Status),
            _ => None,
        }
    }

    fn compare(&self, a: &ChecklistItem, b: &ChecklistItem) -> Ordering {
        match self {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Feature => a.feature.cmp(&b.feature),
            SortKey::Text => a.text.cmp(&b.text),
            SortKey::Bug => a.bug_display().cmp(b.bug_display()),
            SortKey::Status => a.status.cmp(&b.status),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown sort key: {}", s))
    }
}

/// Sort key plus direction. Sorting is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSort {
    pub key: SortKey,
    pub descending: bool,
}

impl ReportSort {
    pub fn apply(&self, items: &mut [ChecklistItem]) {
        items.sort_by(|a, b| {
            let ordering = self.key.compare(a, b);
            if self.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

/// One exported row, in the fixed column order of [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub feature: String,
    pub id: String,
    pub description: String,
    pub bug_id: String,
    pub status: ItemStatus,
}

impl ReportRow {
    pub fn from_item(item: &ChecklistItem) -> Self {
        Self {
            feature: item.feature.clone(),
            id: item.id.clone(),
            description: item.text.clone(),
            bug_id: item.bug_display().to_string(),
            status: item.status,
        }
    }

    /// Cell values in column order.
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.feature,
            &self.id,
            &self.description,
            &self.bug_id,
            self.status.as_str(),
        ]
    }
}

/// A rendered traceability report.
///
/// The summary always covers the whole session; filter and sort only shape
/// which rows are listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn build(
        session_id: Option<&str>,
        items: &[ChecklistItem],
        filter: &ReportFilter,
        sort: Option<ReportSort>,
    ) -> Self {
        let mut visible: Vec<ChecklistItem> =
            items.iter().filter(|i| filter.matches(i)).cloned().collect();
        if let Some(sort) = sort {
            sort.apply(&mut visible);
        }

        Self {
            session_id: session_id.map(str::to_string),
            generated_at: Utc::now(),
            summary: ReportSummary::from_items(items),
            rows: visible.iter().map(ReportRow::from_item).collect(),
        }
    }
}
