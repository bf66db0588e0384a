use std::time::Duration;

use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::coerce::item_text;
use crate::config::{SheetsConfig, SHEETS_SCOPES};
use crate::error::{AppError, Result};
use crate::sheets::auth::{fetch_access_token, AccessToken};

/// A tab inside the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub sheet_id: i64,
    pub title: String,
}

impl Worksheet {
    /// A1 range covering the whole tab. Quotes in the title are doubled.
    pub fn range(&self) -> String {
        format!("'{}'", self.title.replace('\'', "''"))
    }

    fn anchored(&self, cell: &str) -> String {
        format!("{}!{cell}", self.range())
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets v4 client scoped to one spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: AccessToken,
}

impl SheetsClient {
    /// Authenticate with the configured service account and bind to `spreadsheet_id`.
    pub async fn connect(cfg: &SheetsConfig, spreadsheet_id: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        let token = fetch_access_token(&http, &cfg.credential, SHEETS_SCOPES).await?;
        Ok(Self::with_token(http, &cfg.sheets_api_url, spreadsheet_id, token))
    }

    pub fn with_token(
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: &str,
        token: AccessToken,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub async fn worksheet(&self, title: &str) -> Result<Option<Worksheet>> {
        let mut url = self.spreadsheet_url(None)?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");

        let meta: SpreadsheetMeta = self.send(self.http.get(url)).await?.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == title)
            .map(|p| Worksheet {
                sheet_id: p.sheet_id,
                title: p.title,
            }))
    }

    pub async fn add_worksheet(&self, title: &str, rows: u32, cols: u32) -> Result<Worksheet> {
        let url = self.spreadsheet_url(Some("batchUpdate"))?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });

        let resp: Value = self.send(self.http.post(url).json(&body)).await?.json().await?;
        let props = &resp["replies"][0]["addSheet"]["properties"];
        let sheet_id = props["sheetId"].as_i64().ok_or_else(|| {
            AppError::Sheets(format!("addSheet reply without sheetId: {resp}"))
        })?;

        debug!(title, sheet_id, rows, cols, "created worksheet");
        Ok(Worksheet {
            sheet_id,
            title: props["title"].as_str().unwrap_or(title).to_string(),
        })
    }

    pub async fn clear(&self, ws: &Worksheet) -> Result<()> {
        let url = self.values_url(&ws.range(), Some("clear"))?;
        self.send(self.http.post(url).json(&json!({}))).await?;
        Ok(())
    }

    /// Write `values` starting at `A1`, raw (no formula parsing).
    pub async fn update(&self, ws: &Worksheet, values: &[Vec<String>]) -> Result<()> {
        let range = ws.anchored("A1");
        let mut url = self.values_url(&range, None)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({ "range": range, "majorDimension": "ROWS", "values": values });
        self.send(self.http.put(url).json(&body)).await?;
        Ok(())
    }

    pub async fn get_all_values(&self, ws: &Worksheet) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&ws.range(), None)?;
        let range: ValueRange = self.send(self.http.get(url)).await?.json().await?;
        Ok(range
            .values
            .iter()
            .map(|row| row.iter().map(item_text).collect())
            .collect())
    }

    /// Append rows after the last row with content, raw.
    pub async fn append_rows(&self, ws: &Worksheet, values: &[Vec<String>]) -> Result<()> {
        let mut url = self.values_url(&ws.range(), Some("append"))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({ "majorDimension": "ROWS", "values": values });
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.bearer_auth(self.token.secret()).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AppError::Sheets(format!("{status}: {body}")))
    }

    /// `{base}/v4/spreadsheets/{id}` or `{base}/v4/spreadsheets/{id}:{action}`.
    fn spreadsheet_url(&self, action: Option<&str>) -> Result<Url> {
        let id = match action {
            Some(action) => format!("{}:{action}", self.spreadsheet_id),
            None => self.spreadsheet_id.clone(),
        };
        self.url_with_segments(&["v4", "spreadsheets", id.as_str()])
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}[:{action}]`, range percent-encoded.
    fn values_url(&self, range: &str, action: Option<&str>) -> Result<Url> {
        let range = match action {
            Some(action) => format!("{range}:{action}"),
            None => range.to_string(),
        };
        self.url_with_segments(&[
            "v4",
            "spreadsheets",
            self.spreadsheet_id.as_str(),
            "values",
            range.as_str(),
        ])
    }

    fn url_with_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            AppError::Config(format!("invalid sheets API url {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!("sheets API url cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(url: &str) -> SheetsClient {
        SheetsClient::with_token(reqwest::Client::new(), url, "sheet-1", AccessToken::new("tok"))
    }

    #[test]
    fn ranges_quote_titles() {
        let ws = Worksheet {
            sheet_id: 0,
            title: "Bob's data".to_string(),
        };
        assert_eq!(ws.range(), "'Bob''s data'");
        assert_eq!(ws.anchored("A1"), "'Bob''s data'!A1");
    }

    #[test]
    fn values_url_encodes_range() {
        let client = client_for("http://localhost:9999/");
        let ws = Worksheet {
            sheet_id: 0,
            title: "My Tab".to_string(),
        };
        let url = client.values_url(&ws.range(), Some("clear")).expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:9999/v4/spreadsheets/sheet-1/values/'My%20Tab':clear"
        );
    }

    #[tokio::test]
    async fn worksheet_lookup_by_title() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/spreadsheets/sheet-1")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                r#"{"sheets":[{"properties":{"sheetId":0,"title":"Sheet1"}},
                    {"properties":{"sheetId":77,"title":"Latest"}}]}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let found = client.worksheet("Latest").await.expect("lookup");
        assert_eq!(
            found,
            Some(Worksheet {
                sheet_id: 77,
                title: "Latest".to_string()
            })
        );
        assert_eq!(client.worksheet("Missing").await.expect("lookup"), None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn add_worksheet_reads_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/spreadsheets/sheet-1:batchUpdate")
            .match_body(Matcher::Json(serde_json::json!({
                "requests": [{ "addSheet": { "properties": {
                    "title": "History",
                    "gridProperties": { "rowCount": 2000, "columnCount": 26 }
                }}}]
            })))
            .with_status(200)
            .with_body(
                r#"{"replies":[{"addSheet":{"properties":{"sheetId":12,"title":"History"}}}]}"#,
            )
            .create_async()
            .await;

        let ws = client_for(&server.url())
            .add_worksheet("History", 2000, 26)
            .await
            .expect("add");
        assert_eq!(ws.sheet_id, 12);
        assert_eq!(ws.title, "History");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_value_range_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/spreadsheets/sheet-1/values/'Tab'")
            .with_status(200)
            .with_body(r#"{"range":"'Tab'!A1:Z1000","majorDimension":"ROWS"}"#)
            .create_async()
            .await;

        let ws = Worksheet {
            sheet_id: 1,
            title: "Tab".to_string(),
        };
        let values = client_for(&server.url()).get_all_values(&ws).await.expect("values");
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v4/spreadsheets/sheet-1/values/'Tab':clear")
            .with_status(403)
            .with_body("PERMISSION_DENIED")
            .create_async()
            .await;

        let ws = Worksheet {
            sheet_id: 1,
            title: "Tab".to_string(),
        };
        let err = client_for(&server.url()).clear(&ws).await.unwrap_err();
        match err {
            AppError::Sheets(msg) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("PERMISSION_DENIED"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
