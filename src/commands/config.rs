use super::{Output, json_line};
use crate::config::{Resolved, ResolvedConfig};
use serde::Serialize;
use std::fmt::Display;

/// Result of `qat config show`.
#[derive(Serialize)]
#[serde(transparent)]
pub struct ConfigShow {
    pub config: ResolvedConfig,
}

fn line<T: Display>(key: &str, resolved: &Resolved<T>) -> String {
    format!("{:<14} {} ({})", key, resolved.value, resolved.source)
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let c = &self.config;
        let mut lines = vec![match &c.config_path {
            Some(path) => format!("Config file: {}", path.display()),
            None => "Config file: (none)".to_string(),
        }];
        lines.push(line("host", &c.host));
        lines.push(line("port", &c.port));
        lines.push(format!(
            "{:<14} {} ({})",
            "catalog",
            c.catalog.value.display(),
            c.catalog.source
        ));
        lines.push(line("catalog-cache", &c.catalog_cache));
        lines.push(line("server-url", &c.server_url));
        lines.push(line("log-level", &c.log_level));
        lines.push(line("log-format", &c.log_format));
        lines.push(match &c.log_file {
            Some(file) => format!(
                "{:<14} {} ({})",
                "log-file",
                file.value.display(),
                file.source
            ),
            None => format!("{:<14} (none)", "log-file"),
        });
        lines.join("\n")
    }
}

pub fn config_show(config: &ResolvedConfig) -> ConfigShow {
    ConfigShow {
        config: config.clone(),
    }
}
