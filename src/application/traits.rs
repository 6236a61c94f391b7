//! Port interfaces for the application layer

use async_trait::async_trait;

use crate::generation::{Artifact, GenerationError};

/// Service for writing generated artifacts to the output destination
#[async_trait]
pub trait OutputService: Send + Sync {
    /// Write one artifact, creating parent directories and replacing any
    /// existing file
    async fn write_artifact(&self, artifact: &Artifact) -> Result<(), GenerationError>;
}
