//! Common test utilities for qatrace integration tests.
//!
//! Provides `TestEnv` for isolated runs that never read the user's
//! `~/.config/qatrace/config.kdl`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Catalog used by most tests: three features, one with a single item.
pub const CATALOG: &str = r#"{
    "Login": [
        {"id": "L1", "text": "Valid login succeeds"},
        {"id": "L2", "text": "Invalid password is rejected"}
    ],
    "Cart": [
        {"id": "C1", "text": "Add item to cart"},
        {"id": "C2", "text": "Remove item from cart"}
    ],
    "Search": [
        {"id": "S1", "text": "Search by product name"}
    ]
}"#;

/// A test environment with an isolated working and config directory.
///
/// - `work_dir`: current directory of every command; holds
///   `data/checklists.json` (the default catalog path) when seeded
/// - `home_dir`: stands in for `$HOME` / `$XDG_CONFIG_HOME`
pub struct TestEnv {
    pub work_dir: TempDir,
    pub home_dir: TempDir,
}

impl TestEnv {
    /// Create an environment without a catalog.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            home_dir: TempDir::new().unwrap(),
        }
    }

    /// Create an environment whose default catalog is [`CATALOG`].
    pub fn with_catalog() -> Self {
        let env = Self::new();
        env.write_file("data/checklists.json", CATALOG);
        env
    }

    /// Get a Command for the qat binary, isolated from the caller's config
    /// and `QAT_*` environment.
    pub fn qat(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_qat"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("HOME", self.home_dir.path());
        cmd.env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"));
        for var in [
            "QAT_CONFIG",
            "QAT_HOST",
            "QAT_PORT",
            "QAT_CATALOG",
            "QAT_SERVER_URL",
            "QAT_LOG_LEVEL",
            "QAT_LOG_FORMAT",
            "QAT_LOG_FILE",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Write a file relative to the working directory, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Get the path to the working directory.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
