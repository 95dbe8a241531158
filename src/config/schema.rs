//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The `QatConfig` struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation

use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines (default)
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown log format: {} (expected text or json)", s))
    }
}

/// Settings stored in config.kdl. Every field is optional; unset fields fall
/// through to built-in defaults during resolution.
///
/// # KDL Schema
///
/// ```kdl
/// host "127.0.0.1"
/// port 3000
/// catalog "data/checklists.json"
/// catalog-cache #true
/// server-url "http://127.0.0.1:3000"
/// log-level "info"
/// log-format "text"  // or "json"
/// log-file "/var/log/qatrace/server.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QatConfig {
    /// Address the server binds to
    pub host: Option<String>,

    /// Port the server listens on
    pub port: Option<u16>,

    /// Path of the checklist catalog document
    pub catalog: Option<PathBuf>,

    /// Reuse the parsed catalog until the file's modification time changes
    pub catalog_cache: Option<bool>,

    /// Base URL the session commands talk to
    pub server_url: Option<String>,

    /// Default tracing filter (overridden by RUST_LOG)
    pub log_level: Option<String>,

    pub log_format: Option<LogFormat>,

    /// Append logs to this file in addition to stderr
    pub log_file: Option<PathBuf>,
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn string_node(name: &str, value: &str) -> KdlNode {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    node
}

impl QatConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config text, then validate it.
    pub fn parse(content: &str) -> Result<Self> {
        let doc: KdlDocument = content
            .parse()
            .map_err(|e: kdl::KdlError| Error::Config(e.to_string()))?;
        let config = Self::from_kdl(&doc);
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.port == Some(0) {
            return Err("port must be between 1 and 65535, got 0".to_string());
        }
        if let Some(ref catalog) = self.catalog {
            if catalog.as_os_str().is_empty() {
                return Err("catalog path must not be empty".to_string());
            }
        }
        if let Some(ref host) = self.host {
            if host.trim().is_empty() {
                return Err("host must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Values of the wrong type are ignored with a warning.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.host = first_string(doc, "host").map(str::to_string);

        if let Some(value) = first_value(doc, "port") {
            match value.as_integer().and_then(|i| u16::try_from(i).ok()) {
                Some(port) => config.port = Some(port),
                None => tracing::warn!(?value, "ignoring invalid port in config"),
            }
        }

        config.catalog = first_string(doc, "catalog").map(PathBuf::from);

        if let Some(value) = first_value(doc, "catalog-cache") {
            match value.as_bool() {
                Some(enabled) => config.catalog_cache = Some(enabled),
                None => tracing::warn!(?value, "ignoring non-boolean catalog-cache in config"),
            }
        }

        config.server_url = first_string(doc, "server-url").map(str::to_string);
        config.log_level = first_string(doc, "log-level").map(str::to_string);

        if let Some(s) = first_string(doc, "log-format") {
            config.log_format = LogFormat::parse(s);
            if config.log_format.is_none() {
                tracing::warn!(value = s, "ignoring unknown log-format in config");
            }
        }

        config.log_file = first_string(doc, "log-file").map(PathBuf::from);

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref host) = self.host {
            doc.nodes_mut().push(string_node("host", host));
        }

        if let Some(port) = self.port {
            let mut node = KdlNode::new("port");
            node.push(KdlEntry::new(KdlValue::Integer(port as i128)));
            doc.nodes_mut().push(node);
        }

        if let Some(ref catalog) = self.catalog {
            doc.nodes_mut()
                .push(string_node("catalog", &catalog.to_string_lossy()));
        }

        if let Some(enabled) = self.catalog_cache {
            let mut node = KdlNode::new("catalog-cache");
            node.push(KdlEntry::new(KdlValue::Bool(enabled)));
            doc.nodes_mut().push(node);
        }

        if let Some(ref url) = self.server_url {
            doc.nodes_mut().push(string_node("server-url", url));
        }

        if let Some(ref level) = self.log_level {
            doc.nodes_mut().push(string_node("log-level", level));
        }

        if let Some(format) = self.log_format {
            doc.nodes_mut()
                .push(string_node("log-format", format.as_str()));
        }

        if let Some(ref file) = self.log_file {
            doc.nodes_mut()
                .push(string_node("log-file", &file.to_string_lossy()));
        }

        doc
    }
}
