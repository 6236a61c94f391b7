//! Static check that rejects templates which try to load other modules.
//!
//! The sandbox has no module resolution, so an import would otherwise fail
//! deep inside evaluation with an opaque message.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::generation::GenerationError;

static MODULE_LOADS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // import x from "y" / import { a } from "y" / import "y" / import x = require("y")
        r#"(?m)^[ \t]*import\s*(?:[\w$*{]|["'])"#,
        // import("y")
        r"(?m)(?:^|[^.\w$])import\s*\(",
        // require("y")
        r"(?m)(?:^|[^.\w$])require\s*\(",
        // export { a } from "y" / export * from "y"
        r"(?m)^[ \t]*export\s+(?:type\s+)?(?:\*|\{[^}]*\})\s*(?:as\s+[\w$]+\s*)?from\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("module load pattern is valid"))
    .collect()
});

/// Fails with [`GenerationError::ForbiddenImport`] when `source` contains an
/// import statement, a re-export, or a dynamic module-load call.
pub fn assert_no_imports(source: &str, file: &str) -> Result<(), GenerationError> {
    for pattern in MODULE_LOADS.iter() {
        if let Some(found) = pattern.find(source) {
            let statement = source[found.start()..]
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            return Err(GenerationError::ForbiddenImport {
                file: file.to_string(),
                statement,
            });
        }
    }
    Ok(())
}
