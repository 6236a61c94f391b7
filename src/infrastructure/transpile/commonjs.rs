//! Rewriting of ES module exports onto the CommonJS `exports` object.
//!
//! Named exports become live getters declared ahead of the module body, the
//! default export becomes an assignment to `exports.default`.

use std::collections::HashSet;

use tree_sitter::Node;

use super::{Edits, TranspileFailure, keyword, named_children, text};

const ES_MODULE_MARKER: &str = "Object.defineProperty(exports, \"__esModule\", { value: true });";

/// Named default exports that stay declarations in the output
const DEFAULT_DECLARATIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "abstract_class_declaration",
    "function_expression",
    "generator_function",
    "class",
];

/// Exports collected from the top level of a module
#[derive(Debug, Default)]
pub(super) struct ModuleExports {
    /// Exported name as a string literal, paired with the local binding
    bindings: Vec<(String, String)>,
    /// Name of a declared default function or class
    default_name: Option<String>,
    has_default: bool,
}

impl ModuleExports {
    /// Surrounds the rewritten module body with the export header and the
    /// trailing default assignment. The header stays on the first line.
    pub fn wrap(self, body: String) -> String {
        let mut output = String::from(ES_MODULE_MARKER);
        let mut seen = HashSet::new();
        for (exported, local) in &self.bindings {
            if seen.insert(exported.as_str()) {
                output.push_str(&format!(
                    " Object.defineProperty(exports, {exported}, {{ enumerable: true, get: function () {{ return {local}; }} }});"
                ));
            }
        }

        output.push_str(&body);
        if let Some(name) = self.default_name {
            output.push_str(&format!("\nexports.default = {name};\n"));
        }
        output
    }
}

/// What one `export` statement contributes to a module or namespace
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ExportForm {
    /// Only type syntax; the whole statement disappears
    TypeOnly,
    /// `export <declaration>`, exported under the declared names
    Declaration(Vec<String>),
    /// `export { a, b as c }` as (exported name literal, local name) pairs
    List(Vec<(String, String)>),
    /// `export default function name` or `export default class Name`
    DefaultDeclaration(String),
    /// `export default <expression>`; the offset ends the `default` keyword
    DefaultValue(usize),
}

pub(super) fn rewrite_exports(
    source: &str,
    root: Node<'_>,
    edits: &mut Edits,
) -> Result<ModuleExports, TranspileFailure> {
    let mut exports = ModuleExports::default();

    for statement in named_children(root) {
        if statement.kind() != "export_statement" {
            continue;
        }

        let form = classify_export(source, statement)?;
        if matches!(form, ExportForm::DefaultDeclaration(_) | ExportForm::DefaultValue(_)) {
            if exports.has_default {
                return Err(TranspileFailure::at(statement, "Duplicate default export"));
            }
            exports.has_default = true;
        }

        match form {
            ExportForm::TypeOnly => edits.blank_node(statement),
            ExportForm::Declaration(names) => {
                blank_export_keyword(statement, edits);
                exports
                    .bindings
                    .extend(names.into_iter().map(|name| (quote(&name), name)));
            }
            ExportForm::List(pairs) => {
                edits.blank_node(statement);
                exports.bindings.extend(pairs);
            }
            ExportForm::DefaultDeclaration(name) => {
                edits.blank(statement.start_byte(), default_keyword_end(statement));
                exports.default_name = Some(name);
            }
            ExportForm::DefaultValue(keyword_end) => {
                edits.replace(statement.start_byte(), keyword_end, "exports.default =");
            }
        }
    }

    Ok(exports)
}

/// Classifies one `export_statement` node.
pub(super) fn classify_export(source: &str, statement: Node<'_>) -> Result<ExportForm, TranspileFailure> {
    if statement.child_by_field_name("source").is_some() {
        return Err(TranspileFailure::at(statement, "Re-exports are not supported in templates"));
    }
    if keyword(statement, "=").is_some() {
        return Err(TranspileFailure::at(statement, "'export =' is not supported in templates"));
    }
    if keyword(statement, "type").is_some() {
        return Ok(ExportForm::TypeOnly);
    }

    if keyword(statement, "default").is_some() {
        let exported = statement
            .child_by_field_name("declaration")
            .or_else(|| statement.child_by_field_name("value"));
        if let Some(exported) = exported {
            if is_type_only(exported) {
                return Ok(ExportForm::TypeOnly);
            }
            let named = exported
                .child_by_field_name("name")
                .filter(|_| DEFAULT_DECLARATIONS.contains(&exported.kind()));
            if let Some(name) = named {
                return Ok(ExportForm::DefaultDeclaration(text(source, name).to_string()));
            }
        }
        return Ok(ExportForm::DefaultValue(default_keyword_end(statement)));
    }

    if let Some(declaration) = statement.child_by_field_name("declaration") {
        if is_type_only(declaration) {
            return Ok(ExportForm::TypeOnly);
        }
        let names = declared_names(source, declaration)?;
        return Ok(ExportForm::Declaration(names));
    }

    let clause = named_children(statement)
        .into_iter()
        .find(|child| child.kind() == "export_clause")
        .ok_or_else(|| TranspileFailure::at(statement, "Unsupported export statement"))?;

    let mut pairs = Vec::new();
    for specifier in named_children(clause) {
        if keyword(specifier, "type").is_some() {
            continue;
        }
        let name = specifier
            .child_by_field_name("name")
            .ok_or_else(|| TranspileFailure::at(specifier, "Expected a local name in export list"))?;
        let exported = match specifier.child_by_field_name("alias") {
            Some(alias) if alias.kind() == "string" => text(source, alias).to_string(),
            Some(alias) => quote(text(source, alias)),
            None => quote(text(source, name)),
        };
        pairs.push((exported, text(source, name).to_string()));
    }
    Ok(ExportForm::List(pairs))
}

/// Declarations that only exist at the type level
pub(super) fn is_type_only(declaration: Node<'_>) -> bool {
    matches!(
        declaration.kind(),
        "type_alias_declaration" | "interface_declaration" | "ambient_declaration" | "function_signature"
    )
}

/// Names bound by a declaration.
pub(super) fn declared_names(source: &str, declaration: Node<'_>) -> Result<Vec<String>, TranspileFailure> {
    let mut names = Vec::new();
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            for declarator in named_children(declaration) {
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    pattern_names(source, pattern, &mut names)?;
                }
            }
        }
        _ => {
            let name = declaration
                .child_by_field_name("name")
                .filter(|name| name.kind() == "identifier" || name.kind() == "type_identifier")
                .ok_or_else(|| TranspileFailure::at(declaration, "Exported declaration needs a name"))?;
            names.push(text(source, name).to_string());
        }
    }
    Ok(names)
}

/// Collects the names bound by an identifier or destructuring pattern.
fn pattern_names(source: &str, pattern: Node<'_>, names: &mut Vec<String>) -> Result<(), TranspileFailure> {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            names.push(text(source, pattern).to_string());
        }
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                pattern_names(source, value, names)?;
            }
        }
        "object_assignment_pattern" | "assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                pattern_names(source, left, names)?;
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            for child in named_children(pattern) {
                pattern_names(source, child, names)?;
            }
        }
        _ => {
            return Err(TranspileFailure::at(
                pattern,
                "Expected a binding name in exported declaration",
            ));
        }
    }
    Ok(())
}

pub(super) fn blank_export_keyword(statement: Node<'_>, edits: &mut Edits) {
    if let Some(export) = keyword(statement, "export") {
        edits.blank_node(export);
    }
}

fn default_keyword_end(statement: Node<'_>) -> usize {
    keyword(statement, "default").map_or(statement.start_byte(), |k| k.end_byte())
}

pub(super) fn quote(name: &str) -> String {
    format!("\"{name}\"")
}
