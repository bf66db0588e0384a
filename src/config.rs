use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::sheets::auth::ServiceAccountKey;

pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";
pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Per-request ceiling applied to every HTTP call (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 20;

/// Environment variable holding the service-account JSON document.
pub const CREDENTIAL_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

pub const SHEETS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Size of a tab created on demand. Columns are widened to the CSV header if needed.
pub const DEFAULT_TAB_ROWS: u32 = 2000;
pub const DEFAULT_TAB_COLS: u32 = 26;

#[derive(Debug, Clone)]
pub struct Config {
    pub gamma_api_url: String,
    pub clob_api_url: String,
    pub log_level: String,
    /// Timeout for each Gamma / CLOB request (REQUEST_TIMEOUT_SECS)
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            gamma_api_url: std::env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| GAMMA_API_URL.to_string()),
            clob_api_url: std::env::var("CLOB_API_URL")
                .unwrap_or_else(|_| CLOB_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: request_timeout_from_env()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub sheets_api_url: String,
    pub request_timeout_secs: u64,
    pub credential: ServiceAccountKey,
}

impl SheetsConfig {
    /// Reads the service-account credential once; the sheet client receives it
    /// through this struct and never touches the environment itself.
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(CREDENTIAL_ENV)
            .map_err(|_| AppError::Credential(format!("Missing env var {CREDENTIAL_ENV}")))?;
        if raw.trim().is_empty() {
            return Err(AppError::Credential(format!("{CREDENTIAL_ENV} is empty")));
        }

        Ok(Self {
            sheets_api_url: std::env::var("SHEETS_API_URL")
                .unwrap_or_else(|_| SHEETS_API_URL.to_string()),
            request_timeout_secs: request_timeout_from_env()?,
            credential: ServiceAccountKey::from_json(&raw)?,
        })
    }
}

fn request_timeout_from_env() -> Result<u64> {
    std::env::var("REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
        .parse::<u64>()
        .map_err(|_| {
            AppError::Config("REQUEST_TIMEOUT_SECS must be a whole number of seconds".to_string())
        })
}

// ---------------------------------------------------------------------------
// Market list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketEntry {
    #[serde(default)]
    pub name: String,
    pub slug: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct MarketsFile {
    #[serde(default)]
    markets: Vec<MarketEntry>,
}

/// Load the market list and keep only enabled entries, preserving file order.
/// `.toml` files are read as TOML, everything else as YAML.
pub fn load_markets(path: &Path) -> Result<Vec<MarketEntry>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("cannot read market config {}: {e}", path.display()))
    })?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let file = if is_toml {
        parse_toml(&contents)?
    } else {
        parse_yaml(&contents)?
    };

    Ok(file.markets.into_iter().filter(|m| m.enabled).collect())
}

fn parse_toml(contents: &str) -> Result<MarketsFile> {
    toml::from_str(contents)
        .map_err(|e| AppError::Config(format!("invalid TOML market config: {e}")))
}

fn parse_yaml(contents: &str) -> Result<MarketsFile> {
    serde_yaml::from_str(contents)
        .map_err(|e| AppError::Config(format!("invalid YAML market config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn yaml_config_keeps_enabled_markets_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            "markets.yaml",
            r#"
markets:
  - name: Fed cut
    slug: fed-cut-december
  - name: Paused
    slug: paused-market
    enabled: false
  - slug: no-name-market
    enabled: true
"#,
        );

        let markets = load_markets(&path).expect("load");
        assert_eq!(markets.len(), 2);
        assert_eq!(markets[0].name, "Fed cut");
        assert_eq!(markets[0].slug, "fed-cut-december");
        assert_eq!(markets[1].name, "");
        assert_eq!(markets[1].slug, "no-name-market");
    }

    #[test]
    fn toml_config_is_selected_by_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            "markets.toml",
            r#"
[[markets]]
name = "Election"
slug = "presidential-election-winner"

[[markets]]
name = "Off"
slug = "off"
enabled = false
"#,
        );

        let markets = load_markets(&path).expect("load");
        assert_eq!(
            markets,
            vec![MarketEntry {
                name: "Election".to_string(),
                slug: "presidential-election-winner".to_string(),
                enabled: true,
            }]
        );
    }

    #[test]
    fn missing_markets_key_yields_empty_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "markets.yaml", "other: 1\n");
        assert!(load_markets(&path).expect("load").is_empty());
    }

    #[test]
    fn missing_slug_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "markets.yaml", "markets:\n  - name: Broken\n");
        assert!(matches!(load_markets(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.yaml");
        assert!(matches!(load_markets(&path), Err(AppError::Config(_))));
    }
}
