//! Checklist catalog reading and merging.
//!
//! The catalog is a read-only JSON document mapping feature names to ordered
//! lists of checklist templates:
//!
//! ```json
//! {
//!   "Cart": [{ "id": "C1", "text": "Add item" }],
//!   "Login": [{ "id": "L1", "text": "Valid credentials" }]
//! }
//! ```
//!
//! The document is validated when loaded, so malformed data never reaches a
//! session. `CatalogReader` re-reads the file on every request unless the
//! modification-time cache is enabled.

use crate::models::{ChecklistTemplate, DraftItem};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// A validated checklist catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    features: BTreeMap<String, Vec<ChecklistTemplate>>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let features: BTreeMap<String, Vec<ChecklistTemplate>> =
            serde_json::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        let catalog = Self { features };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that every template has a non-blank id and text, and that ids
    /// are unique within their feature.
    ///
    /// The same id under two different features is allowed.
    pub fn validate(&self) -> Result<()> {
        for (feature, templates) in &self.features {
            let mut seen = HashSet::new();
            for (index, template) in templates.iter().enumerate() {
                if template.id.trim().is_empty() {
                    return Err(Error::Parse(format!(
                        "feature '{}': item {} has an empty id",
                        feature, index
                    )));
                }
                if template.text.trim().is_empty() {
                    return Err(Error::Parse(format!(
                        "feature '{}': item '{}' has empty text",
                        feature, template.id
                    )));
                }
                if !seen.insert(template.id.as_str()) {
                    return Err(Error::Parse(format!(
                        "feature '{}': duplicate item id '{}'",
                        feature, template.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Feature names, sorted.
    pub fn features(&self) -> Vec<String> {
        self.features.keys().cloned().collect()
    }

    /// Templates registered under a feature, if it exists.
    pub fn templates(&self, feature: &str) -> Option<&[ChecklistTemplate]> {
        self.features.get(feature).map(Vec::as_slice)
    }

    /// Total number of templates across all features.
    pub fn template_count(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }

    /// Concatenate the templates of each requested feature, in request order,
    /// tagging every item with the feature it came from.
    ///
    /// Unknown features are skipped. A feature named twice is merged twice.
    pub fn merge<S: AsRef<str>>(&self, features: &[S]) -> Vec<DraftItem> {
        features
            .iter()
            .filter_map(|feature| {
                let feature = feature.as_ref();
                self.templates(feature).map(|templates| (feature, templates))
            })
            .flat_map(|(feature, templates)| {
                templates
                    .iter()
                    .map(move |template| DraftItem::from_template(template, feature))
            })
            .collect()
    }
}

#[derive(Debug)]
struct CachedCatalog {
    modified: SystemTime,
    catalog: Arc<Catalog>,
}

/// Reads the catalog file and merges checklists on request.
#[derive(Debug)]
pub struct CatalogReader {
    path: PathBuf,
    cache_enabled: bool,
    cache: Mutex<Option<CachedCatalog>>,
}

impl CatalogReader {
    /// Create a reader that re-parses the file on every call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache_enabled: false,
            cache: Mutex::new(None),
        }
    }

    /// Enable or disable caching keyed on the file's modification time.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load (or reuse) the parsed catalog.
    pub fn load(&self) -> Result<Arc<Catalog>> {
        if !self.cache_enabled {
            return self.read_catalog().map(Arc::new);
        }

        let modified = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| self.io_error(e))?;

        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.modified == modified {
                tracing::debug!(path = %self.path.display(), "catalog cache hit");
                return Ok(Arc::clone(&cached.catalog));
            }
        }

        let catalog = Arc::new(self.read_catalog()?);
        *cache = Some(CachedCatalog {
            modified,
            catalog: Arc::clone(&catalog),
        });
        Ok(catalog)
    }

    /// Merge the checklists of the selected features.
    ///
    /// An empty selection fails validation before the catalog is touched.
    pub fn merge<S: AsRef<str>>(&self, features: &[S]) -> Result<Vec<DraftItem>> {
        if features.is_empty() {
            return Err(Error::Validation(
                "Please select at least one feature.".to_string(),
            ));
        }
        let catalog = self.load()?;
        Ok(catalog.merge(features))
    }

    /// Feature names available in the catalog.
    pub fn features(&self) -> Result<Vec<String>> {
        Ok(self.load()?.features())
    }

    fn read_catalog(&self) -> Result<Catalog> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Catalog::from_json_str(&content)
            .map_err(|e| match e {
                Error::Parse(msg) => Error::Parse(format!("{}: {}", self.path.display(), msg)),
                other => other,
            })
    }

    fn io_error(&self, e: std::io::Error) -> Error {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", self.path.display(), e),
        ))
    }
}
