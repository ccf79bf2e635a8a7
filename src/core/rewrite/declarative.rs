//! Compose detection for Kotlin sites.
//!
//! A site is declarative when the code around it runs during composition.
//! Exact answers come from `@Composable` markers; when the nearest boundary is
//! an unmarked lambda the decision falls through an ordered list of
//! heuristics, the first definite answer winning.

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use crate::core::syntax::node::{
    ancestors, child_of_kind, declaration_name, has_token, named_children, node_text,
    walk_preorder,
};

static COMPOSABLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:androidx\.compose\.runtime\.)?Composable\b").unwrap()
});

/// Callback parameters that never run during composition.
pub const NON_COMPOSABLE_PARAMETERS: &[&str] = &[
    "onClick",
    "onLongClick",
    "onDoubleClick",
    "onValueChange",
    "onCheckedChange",
    "onDismissRequest",
    "key",
    "onGloballyPositioned",
    "onFocusChanged",
    "onSizeChanged",
    "onPlacementChanged",
    "onKeyEvent",
    "onPreviewKeyEvent",
];

/// Layout calls whose trailing lambda is composable content.
pub const COMPOSABLE_CONTAINERS: &[&str] = &[
    "Box",
    "Column",
    "Row",
    "LazyColumn",
    "LazyRow",
    "LazyVerticalGrid",
    "Card",
    "Button",
    "IconButton",
    "TextField",
    "OutlinedTextField",
    "Scaffold",
    "Surface",
    "items",
    "item",
    "ModalBottomSheet",
    "DropdownMenu",
    "AlertDialog",
    "Center",
];

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "getter",
    "setter",
    "secondary_constructor",
    "anonymous_initializer",
];

const TYPE_KINDS: &[&str] = &["class_declaration", "object_declaration", "companion_object"];

const LAMBDA_KINDS: &[&str] = &["lambda_literal", "anonymous_function"];

/// Where a lambda is passed to its call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Argument {
    Named(String),
    Trailing,
    Positional { index: usize, last: bool },
}

#[derive(Debug, Clone)]
struct CallSite {
    callee: String,
    argument: Argument,
}

struct Site<'t, 's> {
    node: Node<'t>,
    source: &'s str,
    /// Nearest enclosing function, lambda, or type.
    boundary: Option<Node<'t>>,
    call: Option<CallSite>,
}

type Strategy = fn(&Site) -> Option<bool>;

const STRATEGIES: &[Strategy] = &[
    enclosing_function,
    annotated_lambda,
    resolved_parameter,
    callback_parameter,
    container_content,
    nested_in_composable,
];

/// True when the literal at `node` is evaluated in a composable scope.
pub fn is_declarative(node: Node<'_>, source: &str) -> bool {
    let boundary = ancestors(node).find(|n| {
        let kind = n.kind();
        FUNCTION_KINDS.contains(&kind) || TYPE_KINDS.contains(&kind) || LAMBDA_KINDS.contains(&kind)
    });
    let call = boundary
        .filter(|b| LAMBDA_KINDS.contains(&b.kind()))
        .and_then(|lambda| call_site(lambda, source));
    let site = Site {
        node,
        source,
        boundary,
        call,
    };

    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&site))
        .unwrap_or(false)
}

/// A named function decides on its own marker; types and top level never compose.
fn enclosing_function(site: &Site) -> Option<bool> {
    match site.boundary {
        None => Some(false),
        Some(b) if FUNCTION_KINDS.contains(&b.kind()) => Some(has_composable_marker(b, site.source)),
        Some(b) if TYPE_KINDS.contains(&b.kind()) => Some(false),
        Some(_) => None,
    }
}

fn annotated_lambda(site: &Site) -> Option<bool> {
    let lambda = site.boundary?;
    let parent = lambda.parent()?;
    if !matches!(parent.kind(), "annotated_lambda" | "annotated_expression") {
        return None;
    }
    let prefix = site.source.get(parent.start_byte()..lambda.start_byte())?;
    COMPOSABLE_REGEX.is_match(prefix).then_some(true)
}

/// The callee is declared in this file: read the parameter's type.
fn resolved_parameter(site: &Site) -> Option<bool> {
    let call = site.call.as_ref()?;
    let root = ancestors(site.node).last()?;
    let declaration = find_function(root, &call.callee, site.source)?;
    let parameters = function_parameters(declaration);

    let parameter = match &call.argument {
        Argument::Named(name) => parameters
            .iter()
            .find(|p| declaration_name(**p, site.source) == Some(name.as_str())),
        Argument::Trailing => parameters.last(),
        Argument::Positional { index, .. } => parameters.get(*index),
    }?;

    Some(COMPOSABLE_REGEX.is_match(node_text(*parameter, site.source)))
}

fn callback_parameter(site: &Site) -> Option<bool> {
    match &site.call.as_ref()?.argument {
        Argument::Named(name) if NON_COMPOSABLE_PARAMETERS.contains(&name.as_str()) => Some(false),
        _ => None,
    }
}

fn container_content(site: &Site) -> Option<bool> {
    let call = site.call.as_ref()?;
    let content_slot = matches!(
        call.argument,
        Argument::Trailing | Argument::Positional { last: true, .. }
    );
    (content_slot && COMPOSABLE_CONTAINERS.contains(&call.callee.as_str())).then_some(true)
}

fn nested_in_composable(site: &Site) -> Option<bool> {
    ancestors(site.node)
        .find(|n| n.kind() == "function_declaration")
        .map(|f| has_composable_marker(f, site.source))
}

fn has_composable_marker(declaration: Node<'_>, source: &str) -> bool {
    child_of_kind(declaration, &["modifiers"])
        .is_some_and(|modifiers| COMPOSABLE_REGEX.is_match(node_text(modifiers, source)))
}

/// How `lambda` is passed to the call that receives it.
fn call_site(lambda: Node<'_>, source: &str) -> Option<CallSite> {
    let mut trailing = false;
    let mut argument: Option<Node<'_>> = None;
    let mut child = lambda;

    for parent in ancestors(lambda) {
        match parent.kind() {
            "annotated_lambda" => trailing = true,
            "value_argument" => argument = Some(parent),
            "annotated_expression" | "value_arguments" | "call_suffix" => {}
            "call_expression" => {
                let callee = parent.named_child(0)?;
                if callee == child {
                    return None;
                }
                let argument = match argument {
                    Some(argument) => argument_position(argument, source)?,
                    None if trailing => Argument::Trailing,
                    None => return None,
                };
                return Some(CallSite {
                    callee: simple_callee(node_text(callee, source))?,
                    argument,
                });
            }
            _ => return None,
        }
        child = parent;
    }
    None
}

fn argument_position(argument: Node<'_>, source: &str) -> Option<Argument> {
    if has_token(argument, "=") {
        let label = child_of_kind(argument, &["identifier", "simple_identifier", "value_argument_label"])?;
        let name = node_text(label, source).trim_end_matches('=').trim();
        return Some(Argument::Named(name.to_string()));
    }
    let list = argument.parent()?;
    let siblings: Vec<Node<'_>> = named_children(list)
        .into_iter()
        .filter(|n| n.kind() == "value_argument")
        .collect();
    let index = siblings.iter().position(|n| *n == argument)?;
    Some(Argument::Positional {
        index,
        last: index + 1 == siblings.len(),
    })
}

/// `Modifier.padding`, `foo?.bar<T>` to the called name.
fn simple_callee(text: &str) -> Option<String> {
    let text = text.split('<').next().unwrap_or(text);
    let name = text.rsplit('.').next()?.trim().trim_matches(['?', '!']);
    (!name.is_empty()).then(|| name.to_string())
}

fn find_function<'t>(root: Node<'t>, name: &str, source: &str) -> Option<Node<'t>> {
    let mut found = None;
    walk_preorder(root, &mut |node| {
        if found.is_some() {
            return false;
        }
        if node.kind() == "function_declaration" && declaration_name(node, source) == Some(name) {
            found = Some(node);
            return false;
        }
        true
    });
    found
}

fn function_parameters(declaration: Node<'_>) -> Vec<Node<'_>> {
    let Some(list) = child_of_kind(declaration, &["function_value_parameters"]) else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter_map(|child| match child.kind() {
            "parameter" => Some(child),
            _ => child_of_kind(child, &["parameter"]),
        })
        .collect()
}
