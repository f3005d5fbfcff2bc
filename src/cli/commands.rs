//! CLI commands and argument parsing

use crate::config::Settings;
use clap::{Parser, Subcommand};

/// Stream OData list items as one JSON array
#[derive(Parser, Debug)]
#[command(name = "odata-list-service")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Upstream connection settings
    #[command(flatten)]
    pub settings: Settings,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "port", default_value = "5000")]
        port: u16,
    },

    /// Stream one list to stdout
    Fetch {
        /// List path relative to the base URL (e.g. "Tasks/items")
        list: String,

        /// Only items modified after this timestamp
        #[arg(long)]
        since: Option<String>,

        /// Dot-delimited field path copied into `_updated`
        #[arg(long)]
        since_path: Option<String>,
    },
}
