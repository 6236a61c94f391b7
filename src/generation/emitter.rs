//! Layout of generated JSON text

/// Indent width used by single-artifact templates
pub const SINGLE_ARTIFACT_INDENT: usize = 4;

/// Indent width used by each item of a multi-artifact template
pub const MULTI_ARTIFACT_INDENT: usize = 2;

/// The indent to serialize with: `width` spaces when `pretty`, none for
/// compact output.
pub fn indent_for(pretty: bool, width: usize) -> Option<usize> {
    pretty.then_some(width)
}
