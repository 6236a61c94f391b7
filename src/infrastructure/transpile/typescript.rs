//! Removal of TypeScript-only syntax.
//!
//! Walks the syntax tree and blanks every node that only exists at the type
//! level. Enums and namespaces are lowered to the objects TypeScript itself
//! emits, and constructor parameter properties become field assignments.

use tree_sitter::Node;

use super::commonjs::{ExportForm, blank_export_keyword, classify_export, is_type_only, quote};
use super::{Edits, TranspileFailure, children, keyword, named_children, text};

/// Nodes removed together with everything inside them
const TYPE_NODES: &[&str] = &[
    "type_annotation",
    "type_predicate_annotation",
    "asserts_annotation",
    "opting_type_annotation",
    "omitting_type_annotation",
    "adding_type_annotation",
    "type_parameters",
    "type_arguments",
    "implements_clause",
    "accessibility_modifier",
    "override_modifier",
    "type_alias_declaration",
    "interface_declaration",
    "ambient_declaration",
    "function_signature",
    "abstract_method_signature",
    "index_signature",
    "method_signature",
];

pub(super) fn strip_types(
    source: &str,
    root: Node<'_>,
    edits: &mut Edits,
) -> Result<(), TranspileFailure> {
    Stripper { src: source, edits }.visit(root)
}

enum AutoValue {
    Number(f64),
    After(String),
    Unavailable,
}

struct Stripper<'s, 'e> {
    src: &'s str,
    edits: &'e mut Edits,
}

impl Stripper<'_, '_> {
    fn visit(&mut self, node: Node<'_>) -> Result<(), TranspileFailure> {
        let kind = node.kind();
        if TYPE_NODES.contains(&kind) {
            self.blank_member(node);
            return Ok(());
        }

        match kind {
            // the sandbox wraps module code, so the line cannot stay
            "hash_bang_line" => {
                self.edits.blank_node(node);
                return Ok(());
            }
            "export_statement" if is_type_export(node) => {
                self.edits.blank_node(node);
                return Ok(());
            }
            "enum_declaration" => return self.lower_enum(node),
            "internal_module" | "module" => return self.lower_namespace(node),
            "as_expression" | "satisfies_expression" => {
                if let Some(value) = named_children(node).into_iter().next() {
                    self.edits.blank(value.end_byte(), node.end_byte());
                    return self.visit(value);
                }
            }
            "non_null_expression" => self.blank_keywords(node, &["!"]),
            "variable_declarator" => self.blank_keywords(node, &["!"]),
            "required_parameter" | "optional_parameter" => {
                self.blank_keywords(node, &["?", "readonly"])
            }
            "formal_parameters" => self.this_parameter(node),
            "public_field_definition" => {
                if keyword(node, "declare").is_some() || keyword(node, "abstract").is_some() {
                    self.blank_member(node);
                    return Ok(());
                }
                self.blank_keywords(node, &["?", "!", "readonly"]);
            }
            "method_definition" => {
                self.blank_keywords(node, &["?"]);
                self.parameter_properties(node)?;
            }
            "abstract_class_declaration" => self.blank_keywords(node, &["abstract"]),
            "arrow_function" => self.arrow_return_type(node),
            _ => {}
        }

        for child in children(node) {
            self.visit(child)?;
        }
        Ok(())
    }

    fn blank_keywords(&mut self, node: Node<'_>, kinds: &[&str]) {
        for child in children(node) {
            if !child.is_named() && kinds.contains(&child.kind()) {
                self.edits.blank_node(child);
            }
        }
    }

    /// Blanks `node`, and the separator after it when it is a class member.
    fn blank_member(&mut self, node: Node<'_>) {
        self.edits.blank_node(node);
        let in_class = node.parent().is_some_and(|p| p.kind() == "class_body");
        if let Some(next) = node.next_sibling().filter(|_| in_class) {
            if matches!(next.kind(), ";" | ",") {
                self.edits.blank_node(next);
            }
        }
    }

    /// Drops a `this` parameter along with its trailing comma.
    fn this_parameter(&mut self, params: Node<'_>) {
        let all = children(params);
        for (index, param) in all.iter().enumerate() {
            let is_this = matches!(param.kind(), "required_parameter" | "optional_parameter")
                && param
                    .child_by_field_name("pattern")
                    .is_some_and(|pattern| pattern.kind() == "this");
            if is_this {
                let end = all
                    .get(index + 1)
                    .filter(|next| next.kind() == ",")
                    .map_or(param.end_byte(), |next| next.end_byte());
                self.edits.blank(param.start_byte(), end);
            }
        }
    }

    /// A return type spanning lines would leave a line break before `=>`,
    /// which ends the statement. Its line breaks move after the arrow.
    fn arrow_return_type(&mut self, arrow: Node<'_>) {
        let Some(return_type) = arrow.child_by_field_name("return_type") else {
            return;
        };
        let newlines = text(self.src, return_type).matches('\n').count();
        if newlines == 0 {
            return;
        }
        if let Some(token) = keyword(arrow, "=>") {
            self.edits
                .replace(return_type.start_byte(), return_type.end_byte(), " ");
            self.edits.insert(token.end_byte(), "\n".repeat(newlines));
        }
    }

    /// `constructor(private name: string)` assigns `this.name = name`.
    fn parameter_properties(&mut self, method: Node<'_>) -> Result<(), TranspileFailure> {
        let is_constructor = method
            .child_by_field_name("name")
            .is_some_and(|name| text(self.src, name) == "constructor");
        let (Some(params), Some(body)) = (
            method.child_by_field_name("parameters"),
            method.child_by_field_name("body"),
        ) else {
            return Ok(());
        };
        if !is_constructor {
            return Ok(());
        }

        let mut assignments = String::new();
        for param in named_children(params) {
            let is_property = children(param).iter().any(|child| {
                matches!(child.kind(), "accessibility_modifier" | "override_modifier" | "readonly")
            });
            if !is_property {
                continue;
            }
            let name = param
                .child_by_field_name("pattern")
                .filter(|pattern| pattern.kind() == "identifier")
                .ok_or_else(|| {
                    TranspileFailure::at(param, "Parameter properties must be plain identifiers")
                })?;
            let name = text(self.src, name);
            assignments.push_str(&format!(" this.{name} = {name};"));
        }
        if assignments.is_empty() {
            return Ok(());
        }

        let super_call = named_children(body).into_iter().find(|statement| {
            statement.kind() == "expression_statement"
                && named_children(*statement).first().is_some_and(|call| {
                    call.kind() == "call_expression"
                        && call
                            .child_by_field_name("function")
                            .is_some_and(|callee| callee.kind() == "super")
                })
        });
        let at = super_call.map_or(body.start_byte() + 1, |statement| statement.end_byte());
        self.edits.insert(at, assignments);
        Ok(())
    }

    /// Replaces an enum declaration with an object built by an immediately
    /// invoked function.
    fn lower_enum(&mut self, node: Node<'_>) -> Result<(), TranspileFailure> {
        let (Some(name), Some(body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            return Err(TranspileFailure::at(node, "Malformed enum declaration"));
        };
        let name = text(self.src, name);

        let mut members: Vec<String> = Vec::new();
        let mut lowered = String::new();
        let mut auto = AutoValue::Number(0.0);

        for member in named_children(body) {
            let (key_node, value) = if member.kind() == "enum_assignment" {
                let parts = named_children(member);
                (
                    member.child_by_field_name("name").or(parts.first().copied()),
                    member.child_by_field_name("value").or(parts.get(1).copied()),
                )
            } else {
                (Some(member), None)
            };
            let key_node =
                key_node.ok_or_else(|| TranspileFailure::at(member, "Invalid enum member name"))?;

            let raw = text(self.src, key_node);
            let (member_name, key) = match key_node.kind() {
                "property_identifier" | "identifier" => (raw.to_string(), quote(raw)),
                "string" if raw.len() >= 2 => (raw[1..raw.len() - 1].to_string(), raw.to_string()),
                _ => return Err(TranspileFailure::at(key_node, "Invalid enum member name")),
            };

            match value {
                Some(value) => {
                    let initializer = self.enum_initializer(value, &members, name);
                    if is_string_literal(value) {
                        lowered.push_str(&format!("{name}[{key}] = {initializer}; "));
                        auto = AutoValue::Unavailable;
                    } else {
                        lowered.push_str(&format!("{name}[{name}[{key}] = {initializer}] = {key}; "));
                        auto = match numeric_literal(&initializer) {
                            Some(number) => AutoValue::Number(number + 1.0),
                            None => AutoValue::After(key.clone()),
                        };
                    }
                }
                None => {
                    let assigned = match &auto {
                        AutoValue::Number(number) => format_number(*number),
                        AutoValue::After(previous) => format!("{name}[{previous}] + 1"),
                        AutoValue::Unavailable => {
                            return Err(TranspileFailure::at(
                                key_node,
                                format!("Enum member '{member_name}' must have an initializer"),
                            ));
                        }
                    };
                    lowered.push_str(&format!("{name}[{name}[{key}] = {assigned}] = {key}; "));
                    auto = match auto {
                        AutoValue::Number(number) => AutoValue::Number(number + 1.0),
                        _ => AutoValue::After(key.clone()),
                    };
                }
            }
            members.push(member_name);
        }

        let newlines = text(self.src, node).matches('\n').count();
        let lowered = format!(
            "var {name}; (function ({name}) {{ {lowered}}})({name} || ({name} = {{}}));{}",
            "\n".repeat(newlines)
        );
        self.edits.replace(node.start_byte(), node.end_byte(), lowered);
        Ok(())
    }

    /// Initializer text with references to earlier members qualified by the enum.
    fn enum_initializer(&self, value: Node<'_>, members: &[String], name: &str) -> String {
        let mut references = Vec::new();
        sibling_references(self.src, value, members, &mut references);

        let mut initializer = String::new();
        let mut cursor = value.start_byte();
        for reference in references {
            initializer.push_str(&self.src[cursor..reference.start_byte()]);
            initializer.push_str(&format!("{name}.{}", text(self.src, reference)));
            cursor = reference.end_byte();
        }
        initializer.push_str(&self.src[cursor..value.end_byte()]);
        initializer.replace('\n', " ")
    }

    /// `namespace N { ... }` becomes a function filling the object `N`;
    /// exported members are assigned onto it.
    fn lower_namespace(&mut self, node: Node<'_>) -> Result<(), TranspileFailure> {
        let Some(name) = node.child_by_field_name("name") else {
            self.edits.blank_node(node);
            return Ok(());
        };
        if name.kind() != "identifier" {
            return Err(TranspileFailure::at(
                name,
                "Only namespaces with a single identifier name are supported",
            ));
        }
        let Some(body) = node.child_by_field_name("body") else {
            self.edits.blank_node(node);
            return Ok(());
        };

        let name = text(self.src, name);
        let open = body.start_byte() + 1;
        let newlines = self.src[node.start_byte()..open].matches('\n').count();
        self.edits.replace(
            node.start_byte(),
            open,
            format!("var {name}; (function ({name}) {{{}", "\n".repeat(newlines)),
        );
        self.edits.replace(
            body.end_byte() - 1,
            body.end_byte(),
            format!("}})({name} || ({name} = {{}}));"),
        );

        for statement in named_children(body) {
            if statement.kind() == "export_statement" {
                self.namespace_export(name, statement)?;
            }
            self.visit(statement)?;
        }
        Ok(())
    }

    fn namespace_export(&mut self, namespace: &str, statement: Node<'_>) -> Result<(), TranspileFailure> {
        let pairs = match classify_export(self.src, statement)? {
            ExportForm::TypeOnly => {
                self.edits.blank_node(statement);
                return Ok(());
            }
            ExportForm::Declaration(names) => {
                blank_export_keyword(statement, self.edits);
                names
                    .into_iter()
                    .map(|name| (quote(&name), name))
                    .collect::<Vec<_>>()
            }
            ExportForm::List(pairs) => {
                self.edits.blank_node(statement);
                pairs
            }
            ExportForm::DefaultDeclaration(_) | ExportForm::DefaultValue(_) => {
                return Err(TranspileFailure::at(
                    statement,
                    "Default exports are not allowed in namespaces",
                ));
            }
        };

        let assignments: String = pairs
            .iter()
            .map(|(exported, local)| format!(" {namespace}[{exported}] = {local};"))
            .collect();
        self.edits.insert(statement.end_byte(), assignments);
        Ok(())
    }
}

/// `export type ...`, `export interface ...` and other exports without a
/// runtime part
fn is_type_export(statement: Node<'_>) -> bool {
    keyword(statement, "type").is_some()
        || statement
            .child_by_field_name("declaration")
            .is_some_and(is_type_only)
}

fn is_string_literal(node: Node<'_>) -> bool {
    match node.kind() {
        "string" => true,
        "template_string" => !named_children(node)
            .iter()
            .any(|part| part.kind() == "template_substitution"),
        _ => false,
    }
}

fn sibling_references<'t>(source: &str, node: Node<'t>, members: &[String], found: &mut Vec<Node<'t>>) {
    if node.kind() == "identifier" && members.iter().any(|m| m == text(source, node)) {
        found.push(node);
        return;
    }
    for child in children(node) {
        sibling_references(source, child, members, found);
    }
}

fn numeric_literal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(&hex.replace('_', ""), 16).ok()? as f64
    } else {
        digits.replace('_', "").parse::<f64>().ok()?
    };
    Some(if negative { -value } else { value })
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
