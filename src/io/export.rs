//! Export the joined training table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::Observation;
use crate::error::AppError;

/// Write the joined observations (one row per common month) to a CSV file.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::Artifact(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "month,season,production_tbpd,price_usd")
        .map_err(|e| AppError::Artifact(format!("Failed to write export CSV header: {e}")))?;

    for obs in observations {
        writeln!(
            file,
            "{},{},{:.4},{:.4}",
            obs.month,
            obs.season.display_name(),
            obs.production,
            obs.price,
        )
        .map_err(|e| AppError::Artifact(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
