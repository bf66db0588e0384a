use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, error, info};

use crate::config::MarketEntry;
use crate::error::Result;
use crate::fetcher::ApiClient;
use crate::outcome::resolve_tokens;
use crate::store::{append_row, write_latest};
use crate::types::{opaque_text, MarketMetadata, Side, SnapshotRow};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Snapshot every market in order. A failing market is logged and skipped;
/// only a failure to rewrite the latest file aborts the run.
pub async fn run_snapshot(
    api: &ApiClient,
    markets: &[MarketEntry],
    history_path: &Path,
    latest_path: &Path,
    now: DateTime<Utc>,
) -> Result<RunSummary> {
    let ts_utc = now.to_rfc3339_opts(SecondsFormat::Secs, false);
    let mut latest_rows = Vec::with_capacity(markets.len());
    let mut summary = RunSummary::default();

    for market in markets {
        match snapshot_market(api, market, &ts_utc, history_path).await {
            Ok(row) => {
                info!(
                    slug = %row.market_slug,
                    yes_price = row.yes_price,
                    no_price = row.no_price,
                    "snapshot {} | yes: {:.4} | no: {:.4}",
                    row.market_slug, row.yes_price, row.no_price,
                );
                latest_rows.push(row);
                summary.succeeded += 1;
            }
            Err(e) => {
                error!(slug = %market.slug, "slug={}: {e}", market.slug);
                summary.failed += 1;
            }
        }
    }

    if !latest_rows.is_empty() {
        write_latest(latest_path, &latest_rows)?;
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Snapshot run complete: {} ok, {} failed",
        summary.succeeded,
        summary.failed,
    );
    Ok(summary)
}

async fn snapshot_market(
    api: &ApiClient,
    market: &MarketEntry,
    ts_utc: &str,
    history_path: &Path,
) -> Result<SnapshotRow> {
    let raw = api.market_by_slug(&market.slug).await?;
    let meta = MarketMetadata::from_value(&raw);

    let tokens = resolve_tokens(&meta.outcomes, &meta.token_ids)?;
    debug!(
        slug = %market.slug,
        source = %tokens.source,
        "resolved yes={} no={}",
        tokens.yes_token_id,
        tokens.no_token_id,
    );

    let yes_price = api.price(&tokens.yes_token_id, Side::Buy).await?;
    let no_price = api.price(&tokens.no_token_id, Side::Buy).await?;

    let row = SnapshotRow {
        ts_utc: ts_utc.to_string(),
        market_name: market.name.clone(),
        market_slug: market.slug.clone(),
        market_id: opaque_text(meta.id.as_ref()),
        yes_token_id: tokens.yes_token_id,
        no_token_id: tokens.no_token_id,
        yes_price,
        no_price,
        volume: opaque_text(meta.volume.as_ref()),
        liquidity: opaque_text(meta.liquidity.as_ref()),
    };

    append_row(history_path, &row)?;
    Ok(row)
}
