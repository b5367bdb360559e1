//! Command line configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use yatai::history::MAX_HISTORY;

pub(crate) mod observability;

pub(crate) use observability::{LogFormat, LoggingConfig};

/// Yatai configuration
#[derive(Debug, Parser)]
#[command(name = "yatai", about = "Festival stall bundle pricing", long_about = None)]
pub(crate) struct Cli {
    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// YAML catalog to price against, instead of the built-in festival menu
    #[arg(long, env = "YATAI_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Order history file
    #[arg(
        long,
        env = "YATAI_HISTORY",
        default_value = "yatai-history.json",
        global = true
    )]
    pub history: PathBuf,

    /// Maximum number of orders kept in the history
    #[arg(long, env = "YATAI_HISTORY_LIMIT", default_value_t = MAX_HISTORY, global = true)]
    pub history_limit: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the menu
    Menu,

    /// Price an order and print its receipt
    Quote {
        /// Order lines, e.g. `butaman=2 shikuwasa=1`
        items: Vec<String>,

        /// Save the priced order to the history
        #[arg(long)]
        record: bool,
    },

    /// Inspect or manage saved orders
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum HistoryCommand {
    /// List saved orders, newest first
    List,

    /// Export saved orders as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete all saved orders
    Clear,
}
