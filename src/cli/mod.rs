//! CLI argument definitions for qatrace.

use crate::config::LogFormat;
use crate::models::ItemStatus;
use crate::report::ExportFormat;
use crate::report::SortKey;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// qatrace - QA checklist sessions and traceability reports.
///
/// Start a server with `qat serve`, then drive sessions with `qat session`.
#[derive(Parser, Debug)]
#[command(name = "qat")]
#[command(author, version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("QAT_GIT_COMMIT"),
    ", built ",
    env!("QAT_BUILD_TIMESTAMP"),
    ")"
))]
#[command(about = "Merge QA checklists, track test sessions and export traceability reports")]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Config file to read instead of ~/.config/qatrace/config.kdl
    #[arg(long, global = true, env = "QAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter (e.g. info, debug, qatrace=trace). RUST_LOG wins when set.
    #[arg(long, global = true, env = "QAT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log line format on stderr
    #[arg(long, global = true, env = "QAT_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Also append JSON log lines to this file
    #[arg(long, global = true, env = "QAT_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the checklist and session HTTP server
    Serve {
        /// Address to bind
        #[arg(long, env = "QAT_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "QAT_PORT")]
        port: Option<u16>,

        /// Catalog JSON file
        #[arg(long, env = "QAT_CATALOG")]
        catalog: Option<PathBuf>,

        /// Re-parse the catalog only when its modification time changes
        /// (`--catalog-cache=false` turns off a cache enabled in config.kdl)
        #[arg(
            long,
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true"
        )]
        catalog_cache: Option<bool>,
    },

    /// Offline catalog operations (no server needed)
    Catalog {
        /// Catalog JSON file
        #[arg(long, global = true, env = "QAT_CATALOG")]
        catalog: Option<PathBuf>,

        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Drive test sessions on a running server
    Session {
        /// Server base URL
        #[arg(long, global = true, env = "QAT_SERVER_URL")]
        server: Option<String>,

        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Build a traceability report for a session
    ///
    /// Reads the session from a running server (--session) or from a JSON
    /// file holding either an item array or a session response (--input).
    /// Without -H, csv and text reports on stdout are wrapped as
    /// {"format", "rows", "content"}; pdf and xlsx need --output or --save.
    Report {
        /// Session id to fetch from the server
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        session: Option<String>,

        /// Read items from a JSON file instead of the server
        #[arg(long)]
        input: Option<PathBuf>,

        /// Server base URL
        #[arg(long, env = "QAT_SERVER_URL")]
        server: Option<String>,

        /// Only list items with this status
        #[arg(long)]
        status: Option<ItemStatus>,

        /// Only list items of this feature
        #[arg(long)]
        feature: Option<String>,

        /// Case-insensitive search over id, description and bug id
        #[arg(long)]
        search: Option<String>,

        /// Sort rows by id, feature, text, bug or status
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Output format: text, csv, json, pdf or xlsx (default: json, or text with -H)
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Write the report to this file
        #[arg(short, long, conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Write the report to QA_Report_<session>.<ext> in the current directory
        #[arg(long)]
        save: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List the features in the catalog
    Features,

    /// Merge the checklists of one or more features
    Merge {
        /// Feature names, in the order their items should appear
        #[arg(required = true)]
        features: Vec<String>,
    },

    /// Parse and validate the catalog file
    Check,
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// List the features the server offers
    Features,

    /// Merge features and confirm them as a new session
    Create {
        /// Feature to include (repeatable)
        #[arg(short, long = "feature", required = true)]
        features: Vec<String>,

        /// Checklist item id to leave out (repeatable)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,
    },

    /// Show a session's items and summary
    Show {
        /// Session id
        id: String,
    },

    /// Set one item's status
    Mark {
        /// Session id
        id: String,

        /// Checklist item id
        item: String,

        /// New status: pass, failed or pending
        status: ItemStatus,

        /// Bug reference (recorded as N/A when marking failed without one)
        #[arg(short, long)]
        bug: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,
}
