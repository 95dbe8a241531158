//! Configuration for Qatrace.
//!
//! Settings live in a single KDL file, `config.kdl`, located at:
//! - `--config <path>` or `QAT_CONFIG` when given (the file must exist)
//! - otherwise `~/.config/qatrace/config.kdl` (optional)
//!
//! ## Precedence
//!
//! CLI flag / env var > config.kdl > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DEFAULT_CATALOG, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SERVER_URL, Resolved,
    ResolvedConfig, ValueSource, resolve_config,
};
pub use schema::{LogFormat, QatConfig};

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of config.kdl.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qatrace").join("config.kdl"))
}

/// Read config.kdl.
///
/// An explicit path must exist. The default path is optional: when it is
/// missing an empty config is returned. Returns the config and the path it
/// was read from, if any.
pub fn load_config(explicit: Option<&Path>) -> Result<(QatConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok((QatConfig::default(), None)),
        },
    };

    let content = fs::read_to_string(&path)?;
    let config = QatConfig::parse(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    Ok((config, Some(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        fs::write(&path, "port 3131\nlog-format \"json\"\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.port, Some(3131));
        assert_eq!(config.log_format, Some(LogFormat::Json));
        assert_eq!(source, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.kdl"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_invalid_config_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        fs::write(&path, "port 0").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("config.kdl"));
    }
}
