//! Use case for generating artifacts from every discovered template

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{GenerateArtifactsRequest, GenerateArtifactsResponse};
use crate::generation::{GenerationError, GenerationOrchestrator, TemplateDiscovery};

/// Runs the whole template set, one template at a time, stopping at the
/// first error
pub struct GenerateArtifactsUseCase {
    template_discovery: Arc<dyn TemplateDiscovery>,
    generation_orchestrator: Arc<GenerationOrchestrator>,
}

impl GenerateArtifactsUseCase {
    pub fn new(
        template_discovery: Arc<dyn TemplateDiscovery>,
        generation_orchestrator: Arc<GenerationOrchestrator>,
    ) -> Self {
        Self {
            template_discovery,
            generation_orchestrator,
        }
    }

    pub async fn execute(
        &self,
        request: GenerateArtifactsRequest,
    ) -> Result<GenerateArtifactsResponse, GenerationError> {
        let settings = request.settings;

        info!("🔎 Scanning for templates...");
        debug!(include = ?settings.include, exclude = ?settings.exclude, "Template patterns");

        let paths = self
            .template_discovery
            .discover(&settings.include, &settings.exclude)
            .await?;

        if paths.is_empty() {
            info!("ℹ️ No .ts templates found.");
            return Ok(GenerateArtifactsResponse::default());
        }

        info!("📄 Found {} file(s)", paths.len());

        let mut response = GenerateArtifactsResponse::default();
        for path in &paths {
            let template = self.template_discovery.load(path).await?;
            response.artifacts_written += self
                .generation_orchestrator
                .process(&template, settings.pretty)
                .await?;
            response.files_processed += 1;
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::OutputService;
    use crate::generation::{Artifact, TemplateFile};
    use crate::infrastructure::config::GenerationSettings;
    use crate::infrastructure::sandbox::SandboxRuntime;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves templates from memory and records which ones were loaded
    struct MockTemplateDiscovery {
        templates: Vec<(&'static str, &'static str)>,
        loaded: Mutex<Vec<String>>,
    }

    impl MockTemplateDiscovery {
        fn new(templates: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                templates,
                loaded: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TemplateDiscovery for MockTemplateDiscovery {
        async fn discover(
            &self,
            _include: &[String],
            _exclude: &[String],
        ) -> Result<Vec<String>, GenerationError> {
            Ok(self.templates.iter().map(|(path, _)| path.to_string()).collect())
        }

        async fn load(&self, path: &str) -> Result<TemplateFile, GenerationError> {
            self.loaded.lock().unwrap().push(path.to_string());
            let (_, source) = self
                .templates
                .iter()
                .find(|(p, _)| *p == path)
                .ok_or_else(|| GenerationError::Discovery(format!("unknown template {path}")))?;
            Ok(TemplateFile::new(path, *source))
        }
    }

    #[derive(Default)]
    struct MockOutputService {
        written: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl OutputService for MockOutputService {
        async fn write_artifact(&self, artifact: &Artifact) -> Result<(), GenerationError> {
            self.written.lock().unwrap().push(artifact.path.clone());
            Ok(())
        }
    }

    fn use_case(
        discovery: Arc<MockTemplateDiscovery>,
        output: Arc<MockOutputService>,
    ) -> GenerateArtifactsUseCase {
        let orchestrator = GenerationOrchestrator::new(Arc::new(SandboxRuntime), output);
        GenerateArtifactsUseCase::new(discovery, Arc::new(orchestrator))
    }

    #[tokio::test]
    async fn test_no_templates_is_a_successful_run() {
        let discovery = Arc::new(MockTemplateDiscovery::new(vec![]));
        let output = Arc::new(MockOutputService::default());

        let response = use_case(discovery, output.clone())
            .execute(GenerateArtifactsRequest::default())
            .await
            .unwrap();

        assert_eq!(response, GenerateArtifactsResponse::default());
        assert!(output.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_templates_and_artifacts() {
        let discovery = Arc::new(MockTemplateDiscovery::new(vec![
            ("BP/a.ts", "export default { a: 1 };"),
            ("BP/items/b.ts", "export default [(n) => `b${n}`, (n) => ({ n }), [1, 2, 3]];"),
        ]));
        let output = Arc::new(MockOutputService::default());

        let response = use_case(discovery, output.clone())
            .execute(GenerateArtifactsRequest {
                settings: GenerationSettings::default(),
            })
            .await
            .unwrap();

        assert_eq!(
            response,
            GenerateArtifactsResponse {
                files_processed: 2,
                artifacts_written: 4,
            }
        );
        assert_eq!(
            *output.written.lock().unwrap(),
            vec!["BP/a.json", "BP/items/b1.json", "BP/items/b2.json", "BP/items/b3.json"]
        );
    }

    #[tokio::test]
    async fn test_first_error_stops_the_run() {
        let discovery = Arc::new(MockTemplateDiscovery::new(vec![
            ("BP/a.ts", "export default { a: 1 };"),
            ("BP/b.ts", "export default 5;"),
            ("BP/c.ts", "export default { c: 1 };"),
        ]));
        let output = Arc::new(MockOutputService::default());

        let result = use_case(discovery.clone(), output.clone())
            .execute(GenerateArtifactsRequest::default())
            .await;

        match result {
            Err(GenerationError::UnsupportedTemplate { file, found }) => {
                assert_eq!(file, "BP/b.ts");
                assert_eq!(found, "a number");
            }
            other => panic!("Expected UnsupportedTemplate, got {:?}", other),
        }
        // Earlier artifacts stay written; later templates are never loaded
        assert_eq!(*output.written.lock().unwrap(), vec!["BP/a.json"]);
        assert_eq!(*discovery.loaded.lock().unwrap(), vec!["BP/a.ts", "BP/b.ts"]);
    }
}
