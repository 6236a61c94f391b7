//! Business rules for the generation domain

use crate::generation::{ARTIFACT_EXTENSION, GenerationError};

/// Validates a name produced by a template's name function and returns the
/// artifact file name, with `.json` appended when missing.
///
/// `index` is 1-based and only used for diagnostics.
pub fn artifact_file_name(
    name: Option<&str>,
    index: usize,
    file: &str,
) -> Result<String, GenerationError> {
    let invalid = |message: String| GenerationError::InvalidName {
        file: file.to_string(),
        index,
        message,
    };

    let name = match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Err(invalid(
                "Name generator must return a non-empty string".to_string(),
            ));
        }
    };

    if !is_basename(name) {
        return Err(invalid(format!(
            "Invalid filename '{name}'. Use a basename without directories."
        )));
    }

    if name.ends_with(ARTIFACT_EXTENSION) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}{ARTIFACT_EXTENSION}"))
    }
}

fn is_basename(name: &str) -> bool {
    !name.contains(['/', '\\', '\0']) && name != "." && !name.contains("..")
}
