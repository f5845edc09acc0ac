//! Read/write the model artifact JSON.
//!
//! The artifact is the contract between the training and serving pipelines:
//! besides the serialized forest it records the tool name, crate version,
//! feature-column schema, and season-rule tag, all validated at load time so
//! a retrain that changes the feature layout fails loudly instead of
//! silently misaligning columns.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ForestParams, Metrics, TrainWindow, FEATURE_COLUMNS, SEASON_RULE};
use crate::error::AppError;
use crate::forest::Forest;
use crate::train::TrainOutput;

pub const DEFAULT_ARTIFACT_PATH: &str = "brentcast-model.json";

const TOOL: &str = "brentcast";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub tool: String,
    pub version: String,
    /// Feature schema the forest expects, in column order.
    pub feature_columns: Vec<String>,
    pub season_rule: String,
    pub window: TrainWindow,
    /// Mean production over the training window (default forecast input).
    pub mean_production: f64,
    pub params: ForestParams,
    pub metrics: Metrics,
    pub forest: Forest,
}

/// Write the artifact for a completed training run.
pub fn write_artifact(path: &Path, output: &TrainOutput) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::Artifact(format!("Failed to create artifact '{}': {e}", path.display()))
    })?;

    let artifact = ModelArtifact {
        tool: TOOL.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        season_rule: SEASON_RULE.to_string(),
        window: output.window,
        mean_production: output.mean_production,
        params: output.forest.params(),
        metrics: output.metrics,
        forest: output.forest.clone(),
    };

    serde_json::to_writer_pretty(file, &artifact)
        .map_err(|e| AppError::Artifact(format!("Failed to write artifact: {e}")))?;

    Ok(())
}

/// Read and validate an artifact. Any schema mismatch is terminal for the
/// serving process.
pub fn read_artifact(path: &Path) -> Result<ModelArtifact, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::Artifact(format!(
            "Failed to open artifact '{}': {e}. Run `brentcast train` first.",
            path.display()
        ))
    })?;

    let artifact: ModelArtifact = serde_json::from_reader(file)
        .map_err(|e| AppError::Artifact(format!("Invalid artifact JSON: {e}")))?;

    validate(&artifact)?;
    Ok(artifact)
}

fn validate(artifact: &ModelArtifact) -> Result<(), AppError> {
    if artifact.tool != TOOL {
        return Err(AppError::Artifact(format!(
            "Artifact was written by '{}', not '{TOOL}'.",
            artifact.tool
        )));
    }
    if artifact.feature_columns != FEATURE_COLUMNS {
        return Err(AppError::Artifact(format!(
            "Feature schema mismatch: artifact has {:?}, this build expects {:?}. Retrain the model.",
            artifact.feature_columns, FEATURE_COLUMNS
        )));
    }
    if artifact.season_rule != SEASON_RULE {
        return Err(AppError::Artifact(format!(
            "Season rule mismatch: artifact uses '{}', this build uses '{SEASON_RULE}'. Retrain the model.",
            artifact.season_rule
        )));
    }
    if artifact.forest.n_trees() == 0 {
        return Err(AppError::Artifact("Artifact contains an empty forest.".to_string()));
    }
    if !artifact.mean_production.is_finite() {
        return Err(AppError::Artifact(
            "Artifact mean production is not finite.".to_string(),
        ));
    }
    Ok(())
}
