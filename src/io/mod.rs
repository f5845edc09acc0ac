//! Artifact persistence and CSV export.

pub mod artifact;
pub mod export;

pub use artifact::{read_artifact, write_artifact, ModelArtifact, DEFAULT_ARTIFACT_PATH};
