use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use polymarket_snapshot::config::{load_markets, Config};
use polymarket_snapshot::error::Result;
use polymarket_snapshot::fetcher::ApiClient;
use polymarket_snapshot::snapshot::run_snapshot;

/// Fetch yes/no prices for the configured markets and record them as CSV.
#[derive(Debug, Parser)]
#[command(name = "snapshot")]
struct Args {
    /// Market list (YAML, or TOML when the file ends in .toml)
    config: PathBuf,
    /// Append-only history CSV
    history_csv: PathBuf,
    /// CSV rewritten with only this run's rows
    latest_csv: PathBuf,
}

#[tokio::main]
async fn main() {
    // clap exits with status 2 on missing arguments
    let args = Args::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cfg, args).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config, args: Args) -> Result<()> {
    let markets = load_markets(&args.config)?;
    if markets.is_empty() {
        warn!("No enabled markets in {}", args.config.display());
    } else {
        info!("Loaded {} enabled markets from {}", markets.len(), args.config.display());
    }

    let api = ApiClient::new(&cfg)?;
    run_snapshot(&api, &markets, &args.history_csv, &args.latest_csv, Utc::now()).await?;
    Ok(())
}
