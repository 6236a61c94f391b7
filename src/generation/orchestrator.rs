//! Generation orchestration - runs one template through the whole pipeline

use std::sync::Arc;

use tracing::{Instrument, info, info_span};

use crate::application::OutputService;
use crate::generation::{
    Artifact, ExportedContract, GenerationError, MULTI_ARTIFACT_INDENT, SINGLE_ARTIFACT_INDENT,
    TemplateFile, TemplateInstance, TemplateRuntime, ValueRef, artifact_file_name, indent_for,
};

/// Turns templates into written artifacts
pub struct GenerationOrchestrator {
    runtime: Arc<dyn TemplateRuntime>,
    output: Arc<dyn OutputService>,
}

impl GenerationOrchestrator {
    pub fn new(runtime: Arc<dyn TemplateRuntime>, output: Arc<dyn OutputService>) -> Self {
        Self { runtime, output }
    }

    /// Evaluates `template`, then writes every artifact its default export
    /// describes. Returns the number of artifacts written.
    ///
    /// Artifacts are written one at a time in order; on error, the ones
    /// already written stay on disk.
    pub async fn process(&self, template: &TemplateFile, pretty: bool) -> Result<usize, GenerationError> {
        let span = info_span!("template", file = %template.path);
        self.generate(template, pretty).instrument(span).await
    }

    async fn generate(&self, template: &TemplateFile, pretty: bool) -> Result<usize, GenerationError> {
        let mut instance = self.runtime.instantiate(template)?;
        let exported = instance.default_export();

        match ExportedContract::classify(exported, instance.as_mut(), &template.path)? {
            ExportedContract::SingleArtifact { data } => {
                let content = instance.to_json(data, indent_for(pretty, SINGLE_ARTIFACT_INDENT))?;
                let artifact = Artifact {
                    path: template.single_output_path(),
                    content,
                };
                self.output.write_artifact(&artifact).await?;
                info!("   ✓ {} -> {}", template.path, artifact.path);
                Ok(1)
            }
            ExportedContract::MultiArtifact {
                name_fn,
                data_fn,
                items,
            } => {
                self.generate_items(instance.as_mut(), template, pretty, name_fn, data_fn, &items)
                    .await
            }
            ExportedContract::Invalid { found } => Err(GenerationError::UnsupportedTemplate {
                file: template.path.clone(),
                found,
            }),
        }
    }

    async fn generate_items(
        &self,
        instance: &mut dyn TemplateInstance,
        template: &TemplateFile,
        pretty: bool,
        name_fn: ValueRef,
        data_fn: ValueRef,
        items: &[ValueRef],
    ) -> Result<usize, GenerationError> {
        let total = items.len();
        let mut count = 0;

        for (position, item) in items.iter().enumerate() {
            let index = position + 1;

            let name = instance.call(name_fn, *item)?;
            let file_name = artifact_file_name(instance.string(name).as_deref(), index, &template.path)?;

            let data = instance.call(data_fn, *item)?;
            let content = instance.to_json(data, indent_for(pretty, MULTI_ARTIFACT_INDENT))?;

            let artifact = Artifact {
                path: template.output_path(&file_name),
                content,
            };
            self.output.write_artifact(&artifact).await?;
            info!("   ✓ {} ({index}/{total}) -> {}", template.path, artifact.path);
            count += 1;
        }

        Ok(count)
    }
}
