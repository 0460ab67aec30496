//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// calsync - Keep a local calendar in step with a CalDAV collection
#[derive(Debug, Parser)]
#[command(name = "calsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    // --- Connection flags ---
    /// Calendar collection URL (overrides the config file)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List events
    List {
        /// Only show events starting on this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show one event
    Show {
        /// Event id
        id: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Create an event
    Create {
        /// Event title
        #[arg(long)]
        title: String,

        /// Start time (RFC 3339, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD`)
        #[arg(long)]
        start: String,

        /// End time; defaults to the start
        #[arg(long)]
        end: Option<String>,

        /// Event description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Edit an event
    ///
    /// The old event is deleted and a new one is created in its place, so
    /// the event gets a new id.
    Edit {
        /// Id of the event to replace
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New start time
        #[arg(long)]
        start: Option<String>,

        /// New end time
        #[arg(long)]
        end: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an event
    Delete {
        /// Event id
        id: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
