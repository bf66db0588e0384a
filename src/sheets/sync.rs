use tracing::info;

use crate::config::{DEFAULT_TAB_COLS, DEFAULT_TAB_ROWS};
use crate::error::{AppError, Result};
use crate::sheets::client::{SheetsClient, Worksheet};
use crate::store::CsvTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PushMode {
    /// Clear the tab, then write header and data in one update.
    Replace,
    /// Keep existing content; add the header only if the tab is empty.
    Append,
}

impl std::fmt::Display for PushMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PushMode::Replace => "replace",
            PushMode::Append => "append",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// CSV had no rows at all; the sheet was not touched.
    Empty,
    Replaced { rows: usize },
    Appended { header_written: bool, rows: usize },
}

/// Mirrors a local CSV table into a spreadsheet tab.
pub struct SheetSync {
    client: SheetsClient,
}

impl SheetSync {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }

    pub async fn push(&self, tab: &str, table: &CsvTable, mode: PushMode) -> Result<PushOutcome> {
        if table.is_empty() {
            info!("CSV is empty; nothing to write.");
            return Ok(PushOutcome::Empty);
        }

        let ws = self.get_or_create(tab, table.width()).await?;

        match mode {
            PushMode::Replace => {
                self.client.clear(&ws).await?;
                self.client.update(&ws, &table.all_rows()).await?;
                info!(
                    spreadsheet = self.client.spreadsheet_id(),
                    tab,
                    rows = table.rows.len(),
                    "Replaced tab '{tab}' with {} rows (+ header).",
                    table.rows.len(),
                );
                Ok(PushOutcome::Replaced {
                    rows: table.rows.len(),
                })
            }
            PushMode::Append => {
                let header_written = self.client.get_all_values(&ws).await?.is_empty();
                if header_written {
                    self.client
                        .append_rows(&ws, std::slice::from_ref(&table.header))
                        .await?;
                    info!("Wrote header to empty tab '{tab}'.");
                }

                if table.rows.is_empty() {
                    info!("No data rows to append.");
                } else {
                    self.client.append_rows(&ws, &table.rows).await?;
                    info!(
                        spreadsheet = self.client.spreadsheet_id(),
                        tab,
                        rows = table.rows.len(),
                        "Appended {} rows to '{tab}'.",
                        table.rows.len(),
                    );
                }

                Ok(PushOutcome::Appended {
                    header_written,
                    rows: table.rows.len(),
                })
            }
        }
    }

    /// Strict rewrite: the tab must already exist. Clears it and writes the
    /// whole table from `A1`.
    pub async fn overwrite_existing(&self, tab: &str, table: &CsvTable) -> Result<PushOutcome> {
        if table.is_empty() {
            info!("CSV is empty; nothing to write.");
            return Ok(PushOutcome::Empty);
        }

        let ws = self
            .client
            .worksheet(tab)
            .await?
            .ok_or_else(|| AppError::WorksheetNotFound(tab.to_string()))?;

        self.client.clear(&ws).await?;
        self.client.update(&ws, &table.all_rows()).await?;
        info!(
            spreadsheet = self.client.spreadsheet_id(),
            tab,
            rows = table.rows.len(),
            "Overwrote tab '{tab}' with {} rows (+ header).",
            table.rows.len(),
        );
        Ok(PushOutcome::Replaced {
            rows: table.rows.len(),
        })
    }

    async fn get_or_create(&self, tab: &str, cols_hint: usize) -> Result<Worksheet> {
        if let Some(ws) = self.client.worksheet(tab).await? {
            return Ok(ws);
        }
        let cols = u32::try_from(cols_hint)
            .unwrap_or(u32::MAX)
            .max(DEFAULT_TAB_COLS);
        info!("Tab '{tab}' not found; creating it ({DEFAULT_TAB_ROWS}x{cols}).");
        self.client.add_worksheet(tab, DEFAULT_TAB_ROWS, cols).await
    }
}
