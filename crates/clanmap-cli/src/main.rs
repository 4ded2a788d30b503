//! Clanmap command line generator.

use anyhow::Context;
use clanmap_core::{ClanMap, MapConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

/// Generate a hex map and split it into clan territories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the JSON snapshot (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON snapshot
    #[arg(long)]
    pretty: bool,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of clans
    #[arg(long)]
    owners: Option<usize>,

    /// Hex radius in pixels
    #[arg(long)]
    radius: Option<f64>,

    /// Drawable width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Drawable height in pixels
    #[arg(long)]
    height: Option<f64>,
}

impl Cli {
    /// Load the config file (or defaults) and apply command line overrides
    fn map_config(&self) -> anyhow::Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => MapConfig::default(),
        };

        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(owners) = self.owners {
            config.partition.owner_count = owners;
        }
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing; logs go to stderr so stdout stays clean for JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.map_config()?;

    info!(
        width = config.width,
        height = config.height,
        radius = config.radius,
        owners = config.partition.owner_count,
        "Generating map..."
    );
    let map = ClanMap::generate(&config).context("map generation failed")?;

    output::log_summary(&map);
    output::write_snapshot(&map, cli.output.as_deref(), cli.pretty)
}
