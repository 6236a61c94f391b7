//! TypeScript to CommonJS transpilation for template modules.
//!
//! Templates are parsed with the tree-sitter TypeScript grammar. Transpilation
//! is syntax-only: type syntax is blanked out in place and the module's
//! exports are rewritten onto `exports`. Runtime expressions are copied byte
//! for byte and line numbers are preserved.

mod commonjs;
mod guard;
mod typescript;

pub use guard::assert_no_imports;

use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::generation::GenerationError;

/// Module dialect produced by [`transpile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModuleFormat {
    /// Script code reading `module`/`exports`/`require` from its environment
    #[default]
    CommonJs,
}

/// Transpiles a TypeScript template module into script code for `format`.
pub fn transpile(
    source: &str,
    file: &str,
    format: ModuleFormat,
) -> Result<String, GenerationError> {
    let failed = |failure: TranspileFailure| {
        GenerationError::transpile(
            file,
            format!("{} (line {})", failure.message, line_of(source, failure.offset)),
        )
    };

    let tree = parse(source).map_err(&failed)?;
    let root = tree.root_node();

    let mut edits = Edits::default();
    typescript::strip_types(source, root, &mut edits).map_err(&failed)?;

    let script = match format {
        ModuleFormat::CommonJs => {
            let exports = commonjs::rewrite_exports(source, root, &mut edits).map_err(&failed)?;
            exports.wrap(edits.apply(source))
        }
    };

    debug!(
        source_bytes = source.len(),
        code_bytes = script.len(),
        "Transpiled template"
    );
    Ok(script)
}

/// Parses `source` as TypeScript, failing on the first syntax error.
fn parse(source: &str) -> Result<Tree, TranspileFailure> {
    let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| TranspileFailure::new(format!("TypeScript grammar unavailable: {e}"), 0))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| TranspileFailure::new("Failed to parse source", 0))?;

    if let Some(node) = first_syntax_error(tree.root_node()) {
        let message = if node.is_missing() {
            format!("Expected '{}'", node.kind())
        } else {
            let found = text(source, node).lines().next().unwrap_or_default();
            match found.char_indices().nth(24) {
                Some((cut, _)) => format!("Unexpected '{}...'", &found[..cut]),
                None if found.trim().is_empty() => "Unexpected end of input".to_string(),
                None => format!("Unexpected '{found}'"),
            }
        };
        return Err(TranspileFailure::new(message, node.start_byte()));
    }

    Ok(tree)
}

fn first_syntax_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    children(node).into_iter().find_map(first_syntax_error)
}

/// A transpilation failure at a byte offset of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TranspileFailure {
    pub message: String,
    pub offset: usize,
}

impl TranspileFailure {
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    pub fn at(node: Node<'_>, message: impl Into<String>) -> Self {
        Self::new(message, node.start_byte())
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

pub(crate) fn text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    &source[node.start_byte()..node.end_byte()]
}

pub(crate) fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named children without comments
pub(crate) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// The first anonymous child token of `node` spelled `kind`
pub(crate) fn keyword<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    children(node)
        .into_iter()
        .find(|child| !child.is_named() && child.kind() == kind)
}

/// Text edits against one source string, applied in a single pass.
///
/// An edit that covers earlier edits replaces them; an edit inside an
/// existing one is dropped.
#[derive(Debug, Default)]
pub(crate) struct Edits {
    items: Vec<Edit>,
}

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    /// `None` blanks the range with spaces and keeps its line breaks
    text: Option<String>,
}

impl Edits {
    pub fn blank(&mut self, start: usize, end: usize) {
        self.push(Edit {
            start,
            end,
            text: None,
        });
    }

    pub fn blank_node(&mut self, node: Node<'_>) {
        self.blank(node.start_byte(), node.end_byte());
    }

    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.push(Edit {
            start,
            end,
            text: Some(text.into()),
        });
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.push(Edit {
            start: at,
            end: at,
            text: Some(text.into()),
        });
    }

    fn push(&mut self, edit: Edit) {
        if edit.start < edit.end {
            let covered = self
                .items
                .iter()
                .any(|e| e.start < e.end && e.start <= edit.start && edit.end <= e.end);
            if covered {
                return;
            }
            self.items
                .retain(|e| !(e.start >= edit.start && e.end <= edit.end && e.start < edit.end));
        } else if self
            .items
            .iter()
            .any(|e| e.start < edit.start && edit.start < e.end)
        {
            return;
        }
        self.items.push(edit);
    }

    pub fn apply(mut self, source: &str) -> String {
        // Stable: insertions at one offset keep the order they were made in
        self.items.sort_by_key(|e| (e.start, e.end));

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in self.items {
            if edit.start < cursor {
                continue;
            }
            output.push_str(&source[cursor..edit.start]);
            match edit.text {
                Some(text) => output.push_str(&text),
                None => output.extend(source[edit.start..edit.end].chars().map(|c| match c {
                    '\n' | '\r' => c,
                    _ => ' ',
                })),
            }
            cursor = edit.end;
        }
        output.push_str(&source[cursor..]);
        output
    }
}
