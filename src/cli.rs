//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Trafficd - four-way signalized intersection controller
#[derive(Parser)]
#[command(
    name = "tfd",
    about = "Four-way signalized intersection controller with a live dashboard",
    version,
    after_help = "Logs are written to: ~/.local/share/trafficd/logs/trafficd.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Run the intersection with the live dashboard (the default)
    Run {
        /// Run without the dashboard, logging until SIGINT/SIGTERM
        #[arg(long)]
        headless: bool,

        /// Seed the vehicle generator RNG for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Where the log file lives
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trafficd")
        .join("logs")
        .join("trafficd.log")
}
