//! Command-line argument parsing for TriageBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TriageBuddy - Support ticket triage with calibrated confidence
#[derive(Parser, Debug)]
#[command(name = "triagebuddy")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Classify support tickets, draft KB-grounded replies, and score confidence", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -v (debug), -vv (trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as newline-delimited JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP triage service
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long)]
        bind: Option<String>,
    },

    /// Triage a single request read from a JSON file ("-" for stdin)
    Triage {
        /// Request file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display current configuration
    Config,
}

impl Commands {
    /// Whether the triage input should be read from stdin
    pub fn reads_stdin(&self) -> bool {
        matches!(self, Commands::Triage { input, .. } if input.as_os_str() == "-")
    }
}
