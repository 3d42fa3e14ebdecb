// src/main.rs

mod cli;

use anyhow::{Context, Result};
use buildinfo_snapshot::{BuildInfo, HttpSnapshotClient, SnapshotConfig, reconcile};
use clap::Parser;
use cli::Cli;
use tracing::info;

/// Merge the optional config file with command-line overrides
fn load_config(cli: &Cli) -> Result<SnapshotConfig> {
    let mut config = match &cli.config {
        Some(path) => SnapshotConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SnapshotConfig::default(),
    };

    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(mirror_url) = &cli.mirror_url {
        config.mirror_url = mirror_url.clone();
    }
    if let Some(archive) = &cli.archive {
        config.archive = archive.clone();
    }
    if let Some(suite) = &cli.suite {
        config.suite = suite.clone();
    }
    if let Some(area) = &cli.area {
        config.area = area.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only the result
    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = load_config(&cli)?;
    let build_info = BuildInfo::from_file(&cli.buildinfo)
        .with_context(|| format!("Failed to read {}", cli.buildinfo.display()))?;

    info!(
        "Resolving {} packages against {} {}/{}",
        build_info.packages.len(),
        config.archive,
        config.suite,
        config.area
    );

    let client = HttpSnapshotClient::new(&config)?;
    let resolution = reconcile(&client, &config, &build_info)?;

    println!("{resolution}");
    Ok(())
}
