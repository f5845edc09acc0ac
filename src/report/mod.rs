//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use crate::domain::{Prediction, TrainConfig};
use crate::train::TrainOutput;

/// Row counts carried through the training pipeline for reporting.
#[derive(Debug, Clone, Copy)]
pub struct IngestSummary {
    pub production_rows: usize,
    pub price_rows: usize,
    pub joined_rows: usize,
}

/// Format the full training run summary (ingest counts + window + metrics).
pub fn format_run_summary(
    ingest: &IngestSummary,
    output: &TrainOutput,
    config: &TrainConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== brentcast - Brent price model training ===\n");
    out.push_str(&format!(
        "Sources: production n={} | price n={} | joined n={}\n",
        ingest.production_rows, ingest.price_rows, ingest.joined_rows
    ));
    out.push_str(&format!(
        "Window: {} .. {} ({} years trailing)\n",
        output.window.start, output.window.end, config.window_years
    ));
    out.push_str(&format!(
        "Split: train n={} | test n={} (chronological, no shuffle)\n",
        output.metrics.n_train, output.metrics.n_test
    ));
    out.push_str(&format!(
        "Forest: trees={} seed={}\n",
        config.params.trees, config.params.seed
    ));
    out.push_str(&format!(
        "Held-out: R²={:.4} MAE={:.4} RMSE={:.4}\n",
        output.metrics.r2, output.metrics.mae, output.metrics.rmse
    ));
    out.push_str(&format!(
        "Mean window production: {:.1} tb/d (held constant for forecasts)\n",
        output.mean_production
    ));

    out
}

/// Format a point prediction on one line.
pub fn format_point(prediction: &Prediction) -> String {
    format!(
        "{} ({}): predicted Brent FOB {:.2} USD/bbl at {:.0} tb/d",
        prediction.month,
        prediction.season.display_name(),
        prediction.price,
        prediction.production,
    )
}

/// Format the forward table (month, season, production, predicted price).
pub fn format_forecast_table(rows: &[Prediction]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:<8} {:>14} {:>10}\n",
        "month", "season", "production", "predicted"
    ));
    for row in rows {
        out.push_str(&format!(
            "{:<8} {:<8} {:>14.1} {:>10.2}\n",
            row.month.to_string(),
            row.season.display_name(),
            row.production,
            row.price,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Season;

    fn prediction(month: &str, price: f64) -> Prediction {
        let month = month.parse().unwrap();
        Prediction {
            month,
            season: Season::for_month(month),
            production: 120_000.0,
            price,
        }
    }

    #[test]
    fn table_has_header_and_one_line_per_row() {
        let rows = vec![prediction("2025-07", 71.25), prediction("2025-08", 72.5)];
        let table = format_forecast_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("month"));
        assert!(lines[1].contains("2025-07"));
        assert!(lines[1].contains("71.25"));
        assert!(lines[1].contains("Winter"));
    }

    #[test]
    fn point_line_mentions_month_season_and_price() {
        let line = format_point(&prediction("2025-12", 69.9));
        assert!(line.contains("2025-12"));
        assert!(line.contains("Summer"));
        assert!(line.contains("69.90"));
    }
}
