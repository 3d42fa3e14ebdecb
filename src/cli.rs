// src/cli.rs
//! CLI definitions for buildinfo-snapshot

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buildinfo-snapshot")]
#[command(author = "Conary Contributors")]
#[command(version)]
#[command(
    about = "Find the earliest snapshot.debian.org snapshot containing a build environment",
    long_about = None
)]
pub struct Cli {
    /// Path to the .buildinfo file
    pub buildinfo: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Snapshot machine-readable API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Snapshot mirror base URL
    #[arg(long)]
    pub mirror_url: Option<String>,

    /// Archive name (debian, debian-ports, debian-security, ...)
    #[arg(short, long)]
    pub archive: Option<String>,

    /// Suite whose index is verified
    #[arg(short, long)]
    pub suite: Option<String>,

    /// Archive area whose index is verified
    #[arg(long)]
    pub area: Option<String>,

    /// HTTP timeout in seconds (0 disables)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Show debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
