//! Filesystem template discovery driven by include/exclude glob patterns

use async_trait::async_trait;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::generation::{GenerationError, TemplateDiscovery, TemplateFile};
use crate::infrastructure::paths::to_forward_slashes;

/// Finds templates under a working directory.
///
/// Patterns are matched against forward-slash paths relative to the root.
/// `*` never crosses a `/`, and hidden files and directories are skipped.
pub struct GlobTemplateDiscovery {
    root: PathBuf,
}

impl GlobTemplateDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TemplateDiscovery for GlobTemplateDiscovery {
    async fn discover(
        &self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>, GenerationError> {
        let include = build_glob_set(include)?;
        let exclude = build_glob_set(exclude)?;
        let root = self.root.clone();

        let paths = tokio::task::spawn_blocking(move || scan(&root, &include, &exclude))
            .await
            .map_err(|e| GenerationError::Discovery(format!("Template scan failed: {e}")))??;

        debug!(count = paths.len(), root = %self.root.display(), "Discovered templates");
        Ok(paths)
    }

    async fn load(&self, path: &str) -> Result<TemplateFile, GenerationError> {
        let source = fs::read_to_string(self.root.join(path))
            .await
            .map_err(|e| GenerationError::io(path, e))?;
        Ok(TemplateFile::new(path, source))
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, GenerationError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|e| GenerationError::Discovery(format!("Invalid glob pattern '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| GenerationError::Discovery(format!("Invalid glob patterns: {e}")))
}

/// Walks `root` and returns matching file paths, deduplicated and sorted.
fn scan(root: &Path, include: &GlobSet, exclude: &GlobSet) -> Result<Vec<String>, GenerationError> {
    let mut paths = BTreeSet::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|e| {
            GenerationError::Discovery(format!("Failed to walk {}: {e}", root.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = to_forward_slashes(relative);
        if include.is_match(&relative) && !exclude.is_match(&relative) {
            paths.insert(relative);
        }
    }

    Ok(paths.into_iter().collect())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
