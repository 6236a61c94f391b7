//! Data Transfer Objects for application layer

use crate::infrastructure::config::GenerationSettings;

/// Request to generate artifacts for every template matched by `settings`
#[derive(Debug, Clone, Default)]
pub struct GenerateArtifactsRequest {
    pub settings: GenerationSettings,
}

/// Totals of a fully successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateArtifactsResponse {
    pub files_processed: usize,
    pub artifacts_written: usize,
}
