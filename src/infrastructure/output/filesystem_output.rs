//! Filesystem-based output service implementation

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::OutputService;
use crate::generation::{Artifact, GenerationError};

/// Output service that writes artifacts below a root directory
pub struct FileSystemOutputService {
    root: PathBuf,
}

impl FileSystemOutputService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_artifact(&self, artifact: &Artifact) -> Result<(), GenerationError> {
        let path = self.root.join(&artifact.path);

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| GenerationError::io(parent.display().to_string(), e))?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| GenerationError::io(&artifact.path, e))?;
        file.write_all(artifact.content.as_bytes())
            .await
            .map_err(|e| GenerationError::io(&artifact.path, e))?;
        file.flush()
            .await
            .map_err(|e| GenerationError::io(&artifact.path, e))?;

        Ok(())
    }
}
