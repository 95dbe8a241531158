//! qat CLI - QA checklist sessions and traceability reports.

use clap::Parser;
use qatrace::cli::{CatalogCommands, Cli, Commands, ConfigCommands, SessionCommands};
use qatrace::client::ApiClient;
use qatrace::commands::{self, Output, ReportOptions, ReportSource};
use qatrace::config::{self, ConfigOverrides, ResolvedConfig};
use qatrace::logging;
use qatrace::report::{ExportFormat, ReportFilter, ReportSort};
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), qatrace::Error> {
    let human = cli.human_readable;
    let overrides = overrides(&cli);

    let (file_config, config_path) = config::load_config(cli.config.as_deref())?;
    let resolved = config::resolve_config(&file_config, config_path, &overrides);
    resolved.validate()?;

    // Keep the guard alive so buffered file log lines are flushed on exit
    let _log_guard = logging::init_logging(&resolved)?;
    tracing::debug!(command = ?cli.command, "running command");

    run_command(cli.command, &resolved, human)
}

/// Collect the config values given on the command line (or via `QAT_*`).
fn overrides(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides {
        log_level: cli.log_level.clone(),
        log_format: cli.log_format,
        log_file: cli.log_file.clone(),
        ..ConfigOverrides::default()
    };

    match &cli.command {
        Commands::Serve {
            host,
            port,
            catalog,
            catalog_cache,
        } => {
            overrides.host = host.clone();
            overrides.port = *port;
            overrides.catalog = catalog.clone();
            overrides.catalog_cache = *catalog_cache;
        }
        Commands::Catalog { catalog, .. } => overrides.catalog = catalog.clone(),
        Commands::Session { server, .. } | Commands::Report { server, .. } => {
            overrides.server_url = server.clone();
        }
        Commands::Config { .. } => {}
    }
    overrides
}

fn run_command(
    command: Commands,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), qatrace::Error> {
    match command {
        Commands::Serve { .. } => run_server(config)?,

        Commands::Catalog { command, .. } => {
            let path = config.catalog.value.as_path();
            match command {
                CatalogCommands::Features => {
                    let result = commands::catalog_features(path)?;
                    output(&result, human);
                }
                CatalogCommands::Merge { features } => {
                    let result = commands::catalog_merge(path, features)?;
                    output(&result, human);
                }
                CatalogCommands::Check => {
                    let result = commands::catalog_check(path)?;
                    output(&result, human);
                }
            }
        }

        Commands::Session { command, .. } => {
            let client = ApiClient::new(&config.server_url.value);
            match command {
                SessionCommands::Features => {
                    let result = commands::session_features(&client)?;
                    output(&result, human);
                }
                SessionCommands::Create { features, exclude } => {
                    let result = commands::session_create(&client, features, &exclude)?;
                    output(&result, human);
                }
                SessionCommands::Show { id } => {
                    let result = commands::session_show(&client, &id)?;
                    output(&result, human);
                }
                SessionCommands::Mark {
                    id,
                    item,
                    status,
                    bug,
                } => {
                    let result = commands::session_mark(&client, &id, &item, status, bug)?;
                    output(&result, human);
                }
            }
        }

        Commands::Report {
            session,
            input,
            server: _,
            status,
            feature,
            search,
            sort,
            desc,
            format,
            output: output_path,
            save,
        } => {
            let source = match (session, input) {
                (Some(id), _) => ReportSource::Session(id),
                (None, Some(path)) => ReportSource::Input(path),
                (None, None) => {
                    return Err(qatrace::Error::Validation(
                        "Either --session or --input is required.".to_string(),
                    ));
                }
            };
            let default_format = if human {
                ExportFormat::Text
            } else {
                ExportFormat::Json
            };
            let options = ReportOptions {
                filter: ReportFilter {
                    status,
                    feature,
                    search,
                },
                sort: sort.map(|key| ReportSort {
                    key,
                    descending: desc,
                }),
                format: format.unwrap_or(default_format),
                output: output_path,
                save,
            };
            let client = ApiClient::new(&config.server_url.value);
            let result = commands::report(&client, &source, &options)?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config);
                output(&result, human);
            }
        },
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Run the API server on a multi-threaded runtime until Ctrl+C.
fn run_server(config: &ResolvedConfig) -> Result<(), qatrace::Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| qatrace::Error::Other(format!("Failed to create runtime: {}", e)))?
        .block_on(qatrace::server::start_server(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_cache_flag_beats_config_file() {
        let cli = Cli::try_parse_from(["qat", "serve", "--catalog-cache=false"]).unwrap();
        let file = config::QatConfig {
            catalog_cache: Some(true),
            ..Default::default()
        };
        let resolved = config::resolve_config(&file, None, &overrides(&cli));
        assert!(!resolved.catalog_cache.value);
        assert_eq!(resolved.catalog_cache.source, config::ValueSource::CliFlag);
    }
}
