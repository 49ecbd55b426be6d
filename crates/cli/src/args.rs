//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tab-bear")]
#[command(version)]
#[command(about = "Inspect and drive a tab-bear capture session", long_about = None)]
pub struct Cli {
    /// Enable verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session database, overrides TAB_BEAR_DB_PATH
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show whether a session is active and how many pages it holds
    Status {
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start a session, discarding previously captured pages
    Start,
    /// Stop the session, keeping captured pages
    Stop,
    /// Capture a markdown file as a page
    Append {
        /// Page URL the markdown was taken from
        #[arg(long)]
        url: String,

        /// Markdown file to read
        #[arg(long)]
        file: PathBuf,

        /// Source tab id; captures without one are skipped
        #[arg(long)]
        tab: Option<u32>,
    },
    /// Write the serialized session to a file
    Export {
        /// Output directory (defaults to the configured export_dir)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the document to stdout instead of writing a file
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },
    /// Check whether a URL is already captured
    Check {
        /// URL to look up (exact match)
        url: String,
    },
}
