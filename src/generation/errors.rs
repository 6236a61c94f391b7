//! Error types for the generation domain

use thiserror::Error;

/// Errors that can occur while turning templates into JSON artifacts.
///
/// Every variant except [`GenerationError::InvalidSettings`] and
/// [`GenerationError::Discovery`] names the template it came from, so a failed
/// run is always attributable to a specific file.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Imports are not allowed in template files: {file} ({statement})")]
    ForbiddenImport { file: String, statement: String },

    #[error("Failed to transpile {file}: {message}")]
    Transpile { file: String, message: String },

    #[error("require('{specifier}') is disabled in templates: {file}")]
    ModuleLoadDisabled { file: String, specifier: String },

    #[error("Failed to evaluate {file}: {message}")]
    Evaluation { file: String, message: String },

    #[error("Invalid default export array in {file}: {message}")]
    Contract { file: String, message: String },

    #[error("Invalid filename for item {index} in {file}: {message}")]
    InvalidName {
        file: String,
        index: usize,
        message: String,
    },

    #[error(
        "Unsupported template in {file} (default export was {found}). Expected either:\n \
         - default export object (single file), or\n \
         - default export array [nameFn, dataFn, items] for multiple files."
    )]
    UnsupportedTemplate { file: String, found: String },

    #[error("Failed to serialize output of {file}: {message}")]
    Serialization { file: String, message: String },

    #[error("Template discovery error: {0}")]
    Discovery(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    pub fn transpile<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Self::Transpile {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn evaluation<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Self::Evaluation {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn contract<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Self::Contract {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn serialization<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Self::Serialization {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn io<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The template this error is attributed to, when there is one.
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::ForbiddenImport { file, .. }
            | Self::Transpile { file, .. }
            | Self::ModuleLoadDisabled { file, .. }
            | Self::Evaluation { file, .. }
            | Self::Contract { file, .. }
            | Self::InvalidName { file, .. }
            | Self::UnsupportedTemplate { file, .. }
            | Self::Serialization { file, .. } => Some(file),
            Self::Discovery(_) | Self::InvalidSettings(_) | Self::Io { .. } => None,
        }
    }
}
