//! Application error type.
//!
//! One enum covers the whole pipeline so every fallible path reports through
//! the same channel and maps to a stable process exit code:
//!
//! - `InvalidInput` (2): bad user input or missing configuration
//! - `DataQuality` (3): unjoinable/empty/too-small merged series
//! - `Acquisition` (4): remote fetch or payload parse failure
//! - `Artifact` (5): persisted output (model artifact, CSV export) failed
//! - `Terminal` (6): TTY setup or draw failure in the TUI

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Out-of-range or malformed user input, or missing configuration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The merged series cannot support a training run.
    #[error("data quality: {0}")]
    DataQuality(String),

    /// Remote fetch failed or the payload was missing expected fields.
    #[error("acquisition: {0}")]
    Acquisition(String),

    /// Persisted output failed: model artifact missing, unreadable, or
    /// incompatible with this build, or an export could not be written.
    #[error("persistence: {0}")]
    Artifact(String),

    /// Terminal setup/draw failure (TUI only).
    #[error("terminal: {0}")]
    Terminal(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidInput(_) => 2,
            AppError::DataQuality(_) => 3,
            AppError::Acquisition(_) => 4,
            AppError::Artifact(_) => 5,
            AppError::Terminal(_) => 6,
        }
    }
}
