use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::{coerce_list, item_text};

/// Column order of the history and latest CSV files.
pub const OUT_FIELDS: [&str; 10] = [
    "ts_utc",
    "market_name",
    "market_slug",
    "market_id",
    "yes_token_id",
    "no_token_id",
    "yes_price",
    "no_price",
    "volume",
    "liquidity",
];

// ---------------------------------------------------------------------------
// Market metadata
// ---------------------------------------------------------------------------

/// The subset of a Gamma market object the snapshot needs.
/// `id`, `volume` and `liquidity` are passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMetadata {
    pub id: Option<Value>,
    pub volume: Option<Value>,
    pub liquidity: Option<Value>,
    pub outcomes: Vec<String>,
    pub token_ids: Vec<String>,
}

impl MarketMetadata {
    pub fn from_value(v: &Value) -> Self {
        let texts = |key: &str| -> Vec<String> {
            coerce_list(v.get(key)).iter().map(item_text).collect()
        };

        Self {
            id: v.get("id").cloned(),
            volume: v.get("volume").cloned(),
            liquidity: v.get("liquidity").cloned(),
            outcomes: texts("outcomes"),
            token_ids: texts("clobTokenIds"),
        }
    }
}

/// Render an opaque pass-through value as a CSV cell.
pub fn opaque_text(v: Option<&Value>) -> String {
    match v {
        None => String::new(),
        Some(v) => item_text(v),
    }
}

// ---------------------------------------------------------------------------
// Token resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingSource {
    /// Outcome labels named both sides.
    Labels,
    /// Labels were missing or unusable; first token taken as yes, second as no.
    Positional,
}

impl std::fmt::Display for PairingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PairingSource::Labels => "labels",
            PairingSource::Positional => "positional",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub yes_token_id: String,
    pub no_token_id: String,
    pub source: PairingSource,
}

// ---------------------------------------------------------------------------
// Quote side
// ---------------------------------------------------------------------------

/// Order-book side passed to the CLOB price endpoint. Snapshots only read
/// the buy side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Snapshot row
// ---------------------------------------------------------------------------

/// One persisted observation. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub ts_utc: String,
    pub market_name: String,
    pub market_slug: String,
    pub market_id: String,
    pub yes_token_id: String,
    pub no_token_id: String,
    pub yes_price: f64,
    pub no_price: f64,
    pub volume: String,
    pub liquidity: String,
}
