use super::{Output, json_line, table};
use crate::Result;
use crate::catalog::CatalogReader;
use crate::models::DraftItem;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of `qat catalog features` and `qat session features`.
#[derive(Serialize)]
pub struct FeatureList {
    pub features: Vec<String>,
}

impl Output for FeatureList {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.features.is_empty() {
            return "No features.".to_string();
        }
        let mut lines = vec![format!("{} feature(s):", self.features.len())];
        lines.extend(self.features.iter().map(|f| format!("  {}", f)));
        lines.join("\n")
    }
}

/// Result of `qat catalog merge`.
#[derive(Debug, Serialize)]
pub struct MergeResult {
    pub features: Vec<String>,
    pub checklists: Vec<DraftItem>,
}

impl Output for MergeResult {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.checklists.is_empty() {
            return format!("No checklist items for: {}", self.features.join(", "));
        }
        let rows: Vec<Vec<String>> = self
            .checklists
            .iter()
            .map(|item| vec![item.feature.clone(), item.id.clone(), item.text.clone()])
            .collect();
        format!(
            "{}\n\n{} item(s) from {}",
            table(&["Feature", "ID", "Text"], &rows),
            self.checklists.len(),
            self.features.join(", ")
        )
    }
}

/// Per-feature template count reported by `qat catalog check`.
#[derive(Serialize)]
pub struct FeatureCount {
    pub feature: String,
    pub templates: usize,
}

/// Result of `qat catalog check`.
#[derive(Serialize)]
pub struct CatalogCheck {
    pub path: PathBuf,
    pub valid: bool,
    pub templates: usize,
    pub features: Vec<FeatureCount>,
}

impl Output for CatalogCheck {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Catalog OK: {} ({} features, {} templates)",
            self.path.display(),
            self.features.len(),
            self.templates
        )];
        lines.extend(
            self.features
                .iter()
                .map(|f| format!("  {}: {}", f.feature, f.templates)),
        );
        lines.join("\n")
    }
}

pub fn catalog_features(path: &Path) -> Result<FeatureList> {
    let features = CatalogReader::new(path).features()?;
    Ok(FeatureList { features })
}

pub fn catalog_merge(path: &Path, features: Vec<String>) -> Result<MergeResult> {
    let checklists = CatalogReader::new(path).merge(&features)?;
    Ok(MergeResult {
        features,
        checklists,
    })
}

/// Parse and validate the catalog. Invalid catalogs are returned as errors.
pub fn catalog_check(path: &Path) -> Result<CatalogCheck> {
    let catalog = CatalogReader::new(path).load()?;
    let features = catalog
        .features()
        .into_iter()
        .map(|feature| {
            let templates = catalog.templates(&feature).map_or(0, <[_]>::len);
            FeatureCount { feature, templates }
        })
        .collect();

    Ok(CatalogCheck {
        path: path.to_path_buf(),
        valid: true,
        templates: catalog.template_count(),
        features,
    })
}
