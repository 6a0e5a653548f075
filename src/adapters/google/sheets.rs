//! Sheets v4 implementation of [`RosterSource`] and [`LedgerSink`]

use super::http::GoogleHttp;
use super::models::{CreateSpreadsheetRequest, Spreadsheet, SpreadsheetProperties, ValueRange};
use crate::adapters::store::traits::remote_file_id;
use crate::adapters::store::{LedgerSink, RosterSource};
use crate::config::GoogleConfig;
use crate::domain::ids::FileId;
use crate::domain::Result;
use async_trait::async_trait;

/// Google Sheets client
#[derive(Clone)]
pub struct SheetsClient {
    http: GoogleHttp,
}

impl SheetsClient {
    /// Creates a client against `google.sheets_base_url`
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        Ok(Self {
            http: GoogleHttp::new(config, &config.sheets_base_url)?,
        })
    }
}

#[async_trait]
impl RosterSource for SheetsClient {
    async fn read_range(&self, sheet: &FileId, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self
            .http
            .endpoint(&["spreadsheets", sheet.as_str(), "values", range])?;
        let values: ValueRange = self.http.send_json(self.http.get(url)).await?;
        let rows = values.into_rows();
        tracing::debug!(sheet = %sheet, range = %range, rows = rows.len(), "Read range");
        Ok(rows)
    }
}

#[async_trait]
impl LedgerSink for SheetsClient {
    async fn create_sheet(&self, title: &str) -> Result<FileId> {
        let url = self.http.endpoint(&["spreadsheets"])?;
        let request = self.http.post(url).json(&CreateSpreadsheetRequest {
            properties: SpreadsheetProperties { title },
        });
        let sheet: Spreadsheet = self.http.send_json(request).await?;
        remote_file_id(sheet.spreadsheet_id)
    }

    async fn append_rows(&self, sheet: &FileId, rows: Vec<Vec<String>>) -> Result<()> {
        let url = self
            .http
            .endpoint(&["spreadsheets", sheet.as_str(), "values", "A1:append"])?;
        let body = ValueRange {
            range: None,
            values: rows
                .into_iter()
                .map(|row| row.into_iter().map(serde_json::Value::String).collect())
                .collect(),
        };
        let request = self
            .http
            .post(url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body);

        self.http.send(request).await?;
        Ok(())
    }
}
