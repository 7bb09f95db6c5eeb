//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay NDJSON RPC traffic through the engine and print a report
    Replay {
        /// File with one `{"topic": ..., "message": ...}` object per line
        file: PathBuf,
        /// Deliver every line at once instead of one after another
        #[arg(long)]
        concurrent: bool,
        /// Make the transport refuse this channel (repeatable)
        #[arg(long = "fail-channel")]
        fail_channels: Vec<String>,
    },
    /// Decode and validate a single envelope file
    Validate {
        /// File holding one RPC envelope
        file: PathBuf,
        /// Route as if delivered on a group topic
        #[arg(long)]
        group: bool,
    },
}
