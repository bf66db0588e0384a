use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::Side;

/// Thin client over the Gamma metadata API and the CLOB price endpoint.
/// One attempt per call; HTTP status errors surface as `AppError::Http`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    gamma_api_url: String,
    clob_api_url: String,
}

impl ApiClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            gamma_api_url: cfg.gamma_api_url.trim_end_matches('/').to_string(),
            clob_api_url: cfg.clob_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Raw Gamma market object for `slug`.
    pub async fn market_by_slug(&self, slug: &str) -> Result<Value> {
        let url = format!("{}/markets/slug/{}", self.gamma_api_url, slug);
        debug!("GET {url}");

        let resp = self.client.get(&url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Quoted price for one token. The CLOB returns `price` as either a
    /// numeric string or a number.
    pub async fn price(&self, token_id: &str, side: Side) -> Result<f64> {
        let url = format!("{}/price", self.clob_api_url);
        debug!("GET {url} token_id={token_id} side={side}");

        let resp: Value = self
            .client
            .get(&url)
            .query(&[("token_id", token_id), ("side", side.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_price(&resp).ok_or_else(|| {
            AppError::Metadata(format!("no usable price for token {token_id}: {resp}"))
        })
    }
}

fn parse_price(resp: &Value) -> Option<f64> {
    resp.get("price")
        .and_then(|p| p.as_f64().or_else(|| p.as_str().and_then(|s| s.trim().parse().ok())))
}
