//! Core types for the generation domain

/// Extension of template source files
pub const TEMPLATE_EXTENSION: &str = ".ts";

/// Extension of generated artifacts
pub const ARTIFACT_EXTENSION: &str = ".json";

/// A template loaded from the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Path relative to the working directory, forward-slash separated
    pub path: String,
    pub source: String,
    /// Directory part of `path`; empty for templates at the root
    pub directory: String,
    /// File name without the `.ts` extension
    pub base_name: String,
}

impl TemplateFile {
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let (directory, file_name) = match path.rsplit_once('/') {
            Some((directory, file_name)) => (directory.to_string(), file_name),
            None => (String::new(), path.as_str()),
        };
        let base_name = file_name
            .strip_suffix(TEMPLATE_EXTENSION)
            .unwrap_or(file_name)
            .to_string();

        Self {
            directory,
            base_name,
            source: source.into(),
            path,
        }
    }

    /// Path of an artifact named `file_name` beside this template.
    pub fn output_path(&self, file_name: &str) -> String {
        if self.directory.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.directory, file_name)
        }
    }

    /// Path of the single artifact named after this template.
    pub fn single_output_path(&self) -> String {
        self.output_path(&format!("{}{}", self.base_name, ARTIFACT_EXTENSION))
    }
}

/// A serialized JSON document ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the working directory, forward-slash separated
    pub path: String,
    pub content: String,
}
