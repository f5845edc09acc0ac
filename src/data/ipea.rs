//! IPEADATA OData integration for the Brent FOB price series.
//!
//! The upstream series (`EIA366_PBRENT366`) is daily and delivered ascending
//! by date. We bucket timestamps to months and keep the first occurrence per
//! month, so each monthly price is the first trading day of that month —
//! matching the reference pipeline.

use std::collections::HashSet;
use std::time::Duration;

use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::{send_with_retry, REQUEST_TIMEOUT_SECS};
use crate::domain::{Month, PriceRecord};
use crate::error::AppError;

const SERIES_CODE: &str = "EIA366_PBRENT366";

pub struct IpeaClient {
    client: Client,
}

impl IpeaClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Acquisition(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch the Brent price series, month-bucketed and deduplicated.
    pub fn fetch_prices(&self) -> Result<Vec<PriceRecord>, AppError> {
        let url = format!("http://www.ipeadata.gov.br/api/odata4/ValoresSerie(SERCODIGO='{SERIES_CODE}')");

        let resp = send_with_retry(self.client.get(url))?;
        if !resp.status().is_success() {
            return Err(AppError::Acquisition(format!(
                "IPEADATA request failed with status {}.",
                resp.status()
            )));
        }

        let body: PriceResponse = resp
            .json()
            .map_err(|e| AppError::Acquisition(format!("Failed to parse IPEADATA response: {e}")))?;

        let records = clean_prices(body);
        if records.is_empty() {
            return Err(AppError::Acquisition(
                "IPEADATA returned no usable price observations.".to_string(),
            ));
        }
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    value: Vec<PriceRow>,
}

/// One OData row. Extraneous columns (SERCODIGO, NIVNOME, TERCODIGO) are
/// discarded by not declaring them.
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "VALDATA")]
    date: String,
    #[serde(rename = "VALVALOR", default)]
    price: Option<f64>,
}

fn clean_prices(body: PriceResponse) -> Vec<PriceRecord> {
    let mut seen: HashSet<Month> = HashSet::new();
    let mut out = Vec::new();

    for row in body.value {
        let Some(month) = parse_month(&row.date) else {
            continue;
        };
        // Rows with missing price are dropped, not imputed.
        let Some(price) = row.price.filter(|p| p.is_finite()) else {
            continue;
        };
        if seen.insert(month) {
            out.push(PriceRecord { month, price });
        }
    }

    out
}

/// Parse an IPEADATA timestamp (RFC3339 with an offset) to a month key.
fn parse_month(raw: &str) -> Option<Month> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(Month::from_date(dt.date_naive()));
    }
    // Some exports ship bare dates; fall back to the YYYY-MM prefix.
    trimmed.get(..7)?.parse().ok()
}
