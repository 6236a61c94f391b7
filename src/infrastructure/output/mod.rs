//! Output service implementations

pub mod filesystem_output;

pub use filesystem_output::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::OutputService;
    use crate::generation::{Artifact, GenerationError};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new(temp_dir.path());

        let artifact = Artifact {
            path: "BP/items/deep/sword.json".to_string(),
            content: "{\n    \"a\": 1\n}".to_string(),
        };
        output_service.write_artifact(&artifact).await.unwrap();

        let content = std::fs::read_to_string(temp_dir.path().join("BP/items/deep/sword.json"))
            .expect("Failed to read artifact");
        assert_eq!(content, "{\n    \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let output_service = FileSystemOutputService::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("a.json"), "a much longer previous content").unwrap();

        let artifact = Artifact {
            path: "a.json".to_string(),
            content: "{}".to_string(),
        };
        output_service.write_artifact(&artifact).await.unwrap();
        output_service.write_artifact(&artifact).await.unwrap();

        assert_eq!(std::fs::read_to_string(temp_dir.path().join("a.json")).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_write_failure_names_the_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // A file where a directory is needed
        std::fs::write(temp_dir.path().join("BP"), "").unwrap();
        let output_service = FileSystemOutputService::new(temp_dir.path());

        let artifact = Artifact {
            path: "BP/a.json".to_string(),
            content: "{}".to_string(),
        };
        let error = output_service.write_artifact(&artifact).await.unwrap_err();
        assert!(matches!(error, GenerationError::Io { .. }));
        assert!(error.to_string().contains("BP"), "{error}");
    }
}
