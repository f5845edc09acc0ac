//! EIA API integration for world oil production.
//!
//! The series is monthly world daily-average production in thousand
//! barrels/day (facets: activity 1 = production, product 53 = crude + lease
//! condensate, region WORL, unit TBPD), requested sorted descending by
//! period as in the reference pipeline.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::{send_with_retry, REQUEST_TIMEOUT_SECS};
use crate::domain::{Month, ProductionRecord};
use crate::error::AppError;

const BASE_URL: &str = "https://api.eia.gov/v2/international/data/";
const PAGE_LENGTH: usize = 5000;

pub struct EiaClient {
    client: Client,
    api_key: String,
}

impl EiaClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("EIA_API_KEY")
            .map_err(|_| AppError::InvalidInput("Missing EIA_API_KEY in environment (.env).".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Acquisition(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_key })
    }

    /// Fetch the monthly world production series, cleaned and deduplicated.
    pub fn fetch_production(&self) -> Result<Vec<ProductionRecord>, AppError> {
        let req = self.client.get(BASE_URL).query(&[
            ("api_key", self.api_key.as_str()),
            ("frequency", "monthly"),
            ("data[0]", "value"),
            ("facets[activityId][]", "1"),
            ("facets[productId][]", "53"),
            ("facets[countryRegionId][]", "WORL"),
            ("facets[unit][]", "TBPD"),
            ("sort[0][column]", "period"),
            ("sort[0][direction]", "desc"),
            ("offset", "0"),
            ("length", &PAGE_LENGTH.to_string()),
        ]);

        let resp = send_with_retry(req)?;
        if !resp.status().is_success() {
            return Err(AppError::Acquisition(format!(
                "EIA request failed with status {}.",
                resp.status()
            )));
        }

        let body: ProductionResponse = resp
            .json()
            .map_err(|e| AppError::Acquisition(format!("Failed to parse EIA response: {e}")))?;

        let records = clean_production(body);
        if records.is_empty() {
            return Err(AppError::Acquisition(
                "EIA returned no usable production observations.".to_string(),
            ));
        }
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct ProductionResponse {
    response: ProductionData,
}

#[derive(Debug, Deserialize)]
struct ProductionData {
    data: Vec<ProductionRow>,
}

#[derive(Debug, Deserialize)]
struct ProductionRow {
    period: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

/// Normalize the raw payload: month-key the period, coerce values, drop
/// non-numeric rows, and deduplicate by month keeping the first occurrence
/// (rows arrive newest-first, so the most recent revision wins).
fn clean_production(body: ProductionResponse) -> Vec<ProductionRecord> {
    let mut seen: HashSet<Month> = HashSet::new();
    let mut out = Vec::with_capacity(body.response.data.len());

    for row in body.response.data {
        let Some(month) = parse_period(&row.period) else {
            continue;
        };
        let Some(value) = coerce_numeric(row.value.as_ref()) else {
            continue;
        };
        if seen.insert(month) {
            out.push(ProductionRecord { month, value });
        }
    }

    out
}

/// Parse an EIA period key (`YYYY-MM`, tolerating a trailing day component).
fn parse_period(raw: &str) -> Option<Month> {
    let trimmed = raw.trim();
    let key = if trimmed.len() > 7 { trimmed.get(..7)? } else { trimmed };
    key.parse().ok()
}

/// Coercion policy: numbers pass through, numeric strings are parsed,
/// everything else becomes missing. Non-finite values are treated as missing.
fn coerce_numeric(value: Option<&serde_json::Value>) -> Option<f64> {
    let v = match value? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fixture(json: &str) -> Vec<ProductionRecord> {
        clean_production(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn parses_typical_payload() {
        let records = parse_fixture(
            r#"{"response":{"data":[
                {"period":"2025-03","value":"82150.4"},
                {"period":"2025-02","value":81900.1}
            ]}}"#,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].month.to_string(), "2025-03");
        assert!((records[0].value - 82150.4).abs() < 1e-9);
        assert!((records[1].value - 81900.1).abs() < 1e-9);
    }

    #[test]
    fn drops_non_numeric_and_missing_values() {
        let records = parse_fixture(
            r#"{"response":{"data":[
                {"period":"2025-03","value":"n/a"},
                {"period":"2025-02"},
                {"period":"2025-01","value":null},
                {"period":"2024-12","value":"81000"}
            ]}}"#,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].month.to_string(), "2024-12");
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_receipt_order() {
        // Descending order of receipt: the first (newest revision) wins.
        let records = parse_fixture(
            r#"{"response":{"data":[
                {"period":"2025-01","value":"82000"},
                {"period":"2025-01","value":"81000"}
            ]}}"#,
        );
        assert_eq!(records.len(), 1);
        assert!((records[0].value - 82000.0).abs() < 1e-9);
    }

    #[test]
    fn tolerates_day_granular_periods() {
        assert_eq!(parse_period("2025-03-01").unwrap().to_string(), "2025-03");
        assert!(parse_period("garbage").is_none());
    }

    #[test]
    fn missing_top_level_field_is_a_parse_error() {
        let parsed: Result<ProductionResponse, _> = serde_json::from_str(r#"{"data":[]}"#);
        assert!(parsed.is_err());
    }
}
