//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (including their `QAT_*` environment variables)
//! 2. config.kdl (`--config`, `QAT_CONFIG`, or `~/.config/qatrace/config.kdl`)
//! 3. Built-in defaults

use crate::config::{LogFormat, QatConfig};
use crate::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CATALOG: &str = "data/checklists.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Value from a CLI flag or its environment variable
    CliFlag,
    /// Value from config.kdl
    ConfigFile,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

fn pick<T: Clone>(cli: &Option<T>, file: &Option<T>, default: T) -> Resolved<T> {
    if let Some(value) = cli {
        Resolved::new(value.clone(), ValueSource::CliFlag)
    } else if let Some(value) = file {
        Resolved::new(value.clone(), ValueSource::ConfigFile)
    } else {
        Resolved::new(default, ValueSource::Default)
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub catalog: Option<PathBuf>,
    pub catalog_cache: Option<bool>,
    pub server_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_catalog(mut self, catalog: impl Into<PathBuf>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Config file that was read, if any
    pub config_path: Option<PathBuf>,
    pub host: Resolved<String>,
    pub port: Resolved<u16>,
    pub catalog: Resolved<PathBuf>,
    pub catalog_cache: Resolved<bool>,
    pub server_url: Resolved<String>,
    pub log_level: Resolved<String>,
    pub log_format: Resolved<LogFormat>,
    /// No default: file logging is off unless configured
    pub log_file: Option<Resolved<PathBuf>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_config(&QatConfig::default(), None, &ConfigOverrides::default())
    }
}

impl ResolvedConfig {
    /// Check the resolved values before they are used to start anything.
    pub fn validate(&self) -> Result<()> {
        if self.port.value == 0 {
            return Err(Error::Config(format!(
                "port must be between 1 and 65535 (from {})",
                self.port.source
            )));
        }
        if self.catalog.value.as_os_str().is_empty() {
            return Err(Error::Config(format!(
                "catalog path must not be empty (from {})",
                self.catalog.source
            )));
        }
        if !self.server_url.value.starts_with("http://")
            && !self.server_url.value.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "server-url must start with http:// or https://, got '{}' (from {})",
                self.server_url.value, self.server_url.source
            )));
        }
        Ok(())
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(
    file: &QatConfig,
    config_path: Option<PathBuf>,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let log_file = match (&overrides.log_file, &file.log_file) {
        (Some(path), _) => Some(Resolved::new(path.clone(), ValueSource::CliFlag)),
        (None, Some(path)) => Some(Resolved::new(path.clone(), ValueSource::ConfigFile)),
        (None, None) => None,
    };

    ResolvedConfig {
        config_path,
        host: pick(&overrides.host, &file.host, DEFAULT_HOST.to_string()),
        port: pick(&overrides.port, &file.port, DEFAULT_PORT),
        catalog: pick(&overrides.catalog, &file.catalog, PathBuf::from(DEFAULT_CATALOG)),
        catalog_cache: pick(&overrides.catalog_cache, &file.catalog_cache, false),
        server_url: pick(
            &overrides.server_url,
            &file.server_url,
            DEFAULT_SERVER_URL.to_string(),
        ),
        log_level: pick(
            &overrides.log_level,
            &file.log_level,
            DEFAULT_LOG_LEVEL.to_string(),
        ),
        log_format: pick(&overrides.log_format, &file.log_format, LogFormat::Text),
        log_file,
    }
}
