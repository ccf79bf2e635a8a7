use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use crate::core::syntax::node::{
    ancestors, child_of_kind, declaration_name, has_token, named_children, node_text,
};

static FRAMEWORK_COMPONENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w*(?:Activity|Fragment)\b").unwrap());

const TYPE_KINDS: &[&str] = &["class_declaration", "object_declaration", "companion_object"];

const SUPERTYPE_KINDS: &[&str] = &[
    "delegation_specifiers",
    "delegation_specifier",
    "superclass",
    "super_interfaces",
];

type Strategy = for<'t> fn(&[Node<'t>], &str) -> Option<String>;

const STRATEGIES: &[Strategy] = &[context_field, framework_component];

/// Receiver prefix for `getString` at `node`: `"context."`, `""`, or `fallback`.
pub fn access_prefix(node: Node<'_>, source: &str, fallback: &str) -> String {
    let types: Vec<Node<'_>> = ancestors(node)
        .filter(|n| TYPE_KINDS.contains(&n.kind()))
        .collect();

    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&types, source))
        .unwrap_or_else(|| fallback.to_string())
}

/// A field or constructor property named like a context, nearest type first.
fn context_field(types: &[Node<'_>], source: &str) -> Option<String> {
    types
        .iter()
        .flat_map(|ty| member_names(*ty, source))
        .find(|name| is_context_name(name))
        .map(|name| format!("{}.", name))
}

/// Inside an Activity or Fragment `getString` needs no receiver.
fn framework_component(types: &[Node<'_>], source: &str) -> Option<String> {
    types
        .iter()
        .any(|ty| {
            declaration_name(*ty, source).is_some_and(is_framework_name)
                || named_children(*ty)
                    .into_iter()
                    .filter(|c| SUPERTYPE_KINDS.contains(&c.kind()))
                    .any(|c| FRAMEWORK_COMPONENT_REGEX.is_match(node_text(c, source)))
        })
        .then(String::new)
}

fn is_context_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("context") || lower.contains("activity")
}

fn is_framework_name(name: &str) -> bool {
    name.ends_with("Activity") || name.ends_with("Fragment")
}

/// Properties and fields declared directly on a type.
fn member_names<'s>(ty: Node<'_>, source: &'s str) -> Vec<&'s str> {
    let mut names = Vec::new();

    // Kotlin `class A(private val context: Context)`
    if let Some(parameters) = child_of_kind(ty, &["primary_constructor"])
        .and_then(|c| child_of_kind(c, &["class_parameters"]))
    {
        for parameter in named_children(parameters) {
            if parameter.kind() == "class_parameter"
                && (has_token(parameter, "val") || has_token(parameter, "var"))
            {
                names.extend(declaration_name(parameter, source));
            }
        }
    }

    let Some(body) = child_of_kind(ty, &["class_body", "enum_class_body"]) else {
        return names;
    };
    for member in named_children(body) {
        match member.kind() {
            "property_declaration" => {
                let declaration = child_of_kind(member, &["variable_declaration"]).unwrap_or(member);
                names.extend(declaration_name(declaration, source));
            }
            "field_declaration" => {
                for declarator in named_children(member) {
                    if declarator.kind() == "variable_declarator" {
                        names.extend(declaration_name(declarator, source));
                    }
                }
            }
            _ => {}
        }
    }
    names
}
