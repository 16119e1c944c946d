//! External lead source adapter over the Google Sheets values API.
//!
//! Rows come back as `{"values": [[..]]}`; cells are mapped defensively with
//! per-column fallbacks so a ragged sheet never breaks intake. Missing
//! credentials degrade to empty results.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{HeatLevel, PipelineStatus, SourceLead};

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Client for the spreadsheet-backed lead source.
#[derive(Clone, Debug)]
pub struct SheetsClient {
    client: Client,
    spreadsheet_id: Option<String>,
    api_key: Option<String>,
    master_range: String,
    incoming_range: String,
}

impl SheetsClient {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            spreadsheet_id: settings.sheets.spreadsheet_id.clone(),
            api_key: settings.sheets.api_key.clone(),
            master_range: settings.sheets.master_range.clone(),
            incoming_range: settings.sheets.incoming_range.clone(),
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.spreadsheet_id.as_deref()?, self.api_key.as_deref()?))
    }

    async fn fetch_rows(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let Some((spreadsheet_id, api_key)) = self.credentials() else {
            tracing::warn!("Sheet credentials not configured, returning no rows");
            return Ok(Vec::new());
        };

        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            spreadsheet_id, range
        );
        let response = self
            .client
            .get(url)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| Error::Sheets(format!("values request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Sheets(format!("HTTP {}: {}", status, text)));
        }

        let body: ValuesResponse = response
            .json()
            .await
            .map_err(|e| Error::Sheets(format!("values decode: {}", e)))?;
        Ok(body.values)
    }

    /// Full CRM sheet rows: client, type, heat, status, notes, value.
    pub async fn master_leads(&self) -> Result<Vec<SourceLead>> {
        let rows = self.fetch_rows(&self.master_range).await?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| map_master_row(index, row))
            .collect())
    }

    /// Website-form rows: name, email, message. Errors degrade to an empty
    /// list so the incoming panel never hard-fails.
    pub async fn incoming_leads(&self) -> Vec<SourceLead> {
        match self.fetch_rows(&self.incoming_range).await {
            Ok(rows) => rows
                .iter()
                .enumerate()
                .map(|(index, row)| map_incoming_row(index, row))
                .collect(),
            Err(e) => {
                tracing::error!("Failed to fetch incoming leads: {}", e);
                Vec::new()
            }
        }
    }
}

fn cell(row: &[Value], index: usize) -> String {
    match row.get(index) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn parse_currency(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn map_master_row(index: usize, row: &[Value]) -> SourceLead {
    let client_name = cell(row, 0);
    let project_type = cell(row, 1);
    SourceLead {
        // Sheet row number; data starts at row 2.
        id: format!("{}", index + 2),
        client_name: if client_name.is_empty() {
            "Unknown Client".to_string()
        } else {
            client_name
        },
        project_type: if project_type.is_empty() {
            "General Project".to_string()
        } else {
            project_type
        },
        heat_level: HeatLevel::parse_lossy(&cell(row, 2)),
        status: PipelineStatus::parse_lossy(&cell(row, 3)),
        notes: cell(row, 4),
        value: parse_currency(&cell(row, 5)),
    }
}

fn map_incoming_row(index: usize, row: &[Value]) -> SourceLead {
    let name = cell(row, 0);
    SourceLead {
        id: format!("incoming-{}", index),
        client_name: if name.is_empty() { "Unknown".to_string() } else { name },
        project_type: "Website Inquiry".to_string(),
        heat_level: HeatLevel::Warm,
        status: PipelineStatus::New,
        notes: format!("Source: Website. Contact: {} {}", cell(row, 1), cell(row, 2)),
        value: 0,
    }
}
