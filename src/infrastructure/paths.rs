//! Mapping of user-declared paths onto the flattened working directory.
//!
//! Projects keep their packs under `packs/BP` and `packs/RP`, but generation
//! runs inside a temporary workspace where `packs/` has been flattened away.
//! Every path that comes from configuration or settings goes through here
//! before it touches the filesystem.

const PACKS_ROOT: &str = "packs/";

/// Normalizes a glob pattern for the working directory.
///
/// Backslashes become forward slashes, a single leading `./` and then a single
/// leading `/` are dropped, and a leading `packs/` segment is removed.
///
/// # Examples
/// ```
/// use packgen::infrastructure::paths::normalize_pattern;
///
/// assert_eq!(normalize_pattern("packs\\BP\\**\\*.ts"), "BP/**/*.ts");
/// assert_eq!(normalize_pattern("./RP/**/*.ts"), "RP/**/*.ts");
/// ```
pub fn normalize_pattern(pattern: &str) -> String {
    let mut rel = pattern.replace('\\', "/");
    if let Some(stripped) = rel.strip_prefix("./") {
        rel = stripped.to_string();
    }
    if let Some(stripped) = rel.strip_prefix('/') {
        rel = stripped.to_string();
    }
    match rel.strip_prefix(PACKS_ROOT) {
        Some(stripped) => stripped.to_string(),
        None => rel,
    }
}

/// Maps a concrete pack reference (e.g. `packs/BP/`) onto its working-directory
/// name (`BP`). Returns `None` when nothing usable is left.
pub fn map_pack_reference(reference: &str) -> Option<String> {
    let rel = normalize_pattern(reference);
    let rel = rel.strip_suffix('/').unwrap_or(&rel);
    if rel.is_empty() {
        None
    } else {
        Some(rel.to_string())
    }
}

/// Converts a filesystem-relative path to the forward-slash form used for
/// template paths and diagnostics.
pub fn to_forward_slashes(path: &std::path::Path) -> String {
    path.components()
        .filter_map(|component| match component {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
