//! cadence-sim - offline review replayer binary.

use std::path::PathBuf;

use anyhow::Context;
use cadence_core::{CadenceConfig, SchedulingRuntime};
use cadence_sim::{load_reviews, replay};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Replay a JSON review log through the cadence scheduling engine.
#[derive(Parser)]
#[command(name = "cadence-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay a review log and print the scheduled reviews as JSON")]
struct Cli {
    /// Path to a JSON array of `{ card, response, profile? }` records
    reviews: PathBuf,

    /// Configuration file (.toml, .json, .yaml); defaults to CADENCE_* variables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start each repeated card from the snapshot produced by its previous review
    #[arg(long)]
    chain: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CadenceConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CadenceConfig::from_env(),
    };

    let records = load_reviews(&cli.reviews)?;
    info!(records = records.len(), chain = cli.chain, "Loaded review log");

    let mut runtime = SchedulingRuntime::new(config).await?;
    runtime.start().await?;

    let mut report = replay(&runtime.engine(), &records, cli.chain);

    report.cache = Some(runtime.shutdown().await?);

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    info!(
        scheduled = report.results.len(),
        rejected = report.rejected.len(),
        "Replay complete"
    );
    Ok(())
}
