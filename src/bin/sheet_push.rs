use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use polymarket_snapshot::config::SheetsConfig;
use polymarket_snapshot::error::Result;
use polymarket_snapshot::sheets::{PushMode, SheetSync, SheetsClient};
use polymarket_snapshot::store::read_table;

/// Push a CSV file into a Google Sheets tab.
#[derive(Debug, Parser)]
#[command(name = "sheet-push")]
struct Args {
    /// CSV file to upload
    #[arg(long)]
    csv: PathBuf,
    /// Spreadsheet key
    #[arg(long = "sheet_id")]
    sheet_id: String,
    /// Tab name; created if missing
    #[arg(long)]
    tab: String,
    #[arg(long, value_enum, default_value_t = PushMode::Replace)]
    mode: PushMode,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let table = read_table(&args.csv)?;
    if table.is_empty() {
        info!("CSV is empty; nothing to write.");
        return Ok(());
    }

    let cfg = SheetsConfig::from_env()?;
    let client = SheetsClient::connect(&cfg, &args.sheet_id).await?;
    let outcome = SheetSync::new(client).push(&args.tab, &table, args.mode).await?;
    info!(mode = %args.mode, "Sheet push finished: {outcome:?}");
    Ok(())
}
