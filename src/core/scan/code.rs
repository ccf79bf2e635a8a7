use std::path::Path;

use anyhow::Result;
use tree_sitter::Node;

use super::{Occurrence, context::syntactic_context};
use crate::core::{
    skip_policy::SkipPolicy,
    syntax::{
        Dialect, Handle,
        imports::ImportTable,
        line_number,
        literal::{Segment, fold_segments},
        node::{has_token, named_children, node_text, walk_preorder},
        parse_code,
    },
};

/// Name and receiver of a call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Callee {
    pub name: String,
    pub receiver: Option<String>,
}

/// Node kinds and decoders describing one code grammar.
pub(super) struct CodeGrammar {
    pub dialect: Dialect,
    pub string_kinds: &'static [&'static str],
    /// Binary expressions that may carry a `+` operator.
    pub concat_kinds: &'static [&'static str],
    pub call_kinds: &'static [&'static str],
    pub annotation_kinds: &'static [&'static str],
    /// Nodes between an argument and its call.
    pub transparent_kinds: &'static [&'static str],
    pub parenthesized_kinds: &'static [&'static str],
    /// Subtrees never scanned (headers, comments).
    pub skipped_kinds: &'static [&'static str],
    pub segments: fn(&str) -> Option<Vec<Segment>>,
    /// Name and receiver of a call, given the call node. `None` when `child`
    /// is the callee or receiver rather than an argument.
    pub callee: fn(Node<'_>, Node<'_>, &str) -> Option<Callee>,
}

impl CodeGrammar {
    pub fn is_string(&self, node: Node<'_>) -> bool {
        self.string_kinds.contains(&node.kind())
    }

    pub fn is_concat(&self, node: Node<'_>) -> bool {
        self.concat_kinds.contains(&node.kind()) && has_token(node, "+")
    }

    /// Operands of a `+` chain. A nested chain, bare or parenthesized, is
    /// flattened only when it is itself string concatenation; an arithmetic
    /// chain such as `(a + b)` stays a single operand.
    fn concat_operands<'t>(&self, node: Node<'t>, out: &mut Vec<Node<'t>>) {
        for child in named_children(node) {
            if is_comment(child) {
                continue;
            }
            match self.string_chain(child) {
                Some(chain) => self.concat_operands(chain, out),
                None => out.push(child),
            }
        }
    }

    /// The `+` chain behind `node` when it contains a string operand.
    fn string_chain<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let chain = if self.is_concat(node) {
            node
        } else {
            self.parenthesized_concat(node)?
        };
        let mut operands = Vec::new();
        self.concat_operands(chain, &mut operands);
        self.contains_string(&operands).then_some(chain)
    }

    fn parenthesized_concat<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if !self.parenthesized_kinds.contains(&node.kind()) {
            return None;
        }
        named_children(node)
            .into_iter()
            .find(|c| !is_comment(*c))
            .filter(|c| self.is_concat(*c))
    }

    fn contains_string(&self, operands: &[Node<'_>]) -> bool {
        operands.iter().any(|o| self.is_string(*o))
    }
}

fn is_comment(node: Node<'_>) -> bool {
    node.kind().contains("comment")
}

/// Walk a parsed file and emit one occurrence per plain literal, template,
/// or concatenation chain.
pub(super) fn detect(
    grammar: &CodeGrammar,
    path: &Path,
    source: &str,
    policy: &SkipPolicy,
) -> Result<Vec<Occurrence>> {
    let tree = parse_code(grammar.dialect, source, None)?;
    let imports = ImportTable::parse(source);
    let mut occurrences = Vec::new();

    walk_preorder(tree.root_node(), &mut |node| {
        if grammar.skipped_kinds.contains(&node.kind()) {
            return false;
        }

        if grammar.is_concat(node) {
            let mut operands = Vec::new();
            grammar.concat_operands(node, &mut operands);
            if !grammar.contains_string(&operands) {
                return true;
            }
            if let Some(occurrence) = fold_chain(grammar, node, &operands, path, source, policy, &imports) {
                occurrences.push(occurrence);
            }
            return false;
        }

        if grammar.is_string(node) {
            let raw = node_text(node, source);
            match (grammar.segments)(raw) {
                Some(segments) => {
                    let mut arguments = Vec::new();
                    let text = fold_segments(&segments, 1, &mut arguments);
                    if let Some(occurrence) =
                        emit(grammar, node, text, arguments, path, source, policy, &imports)
                    {
                        occurrences.push(occurrence);
                    }
                }
                None => {
                    tracing::debug!(path = %path.display(), raw = %raw, "undecodable string literal");
                }
            }
            return false;
        }

        true
    });

    Ok(occurrences)
}

fn fold_chain(
    grammar: &CodeGrammar,
    chain: Node<'_>,
    operands: &[Node<'_>],
    path: &Path,
    source: &str,
    policy: &SkipPolicy,
    imports: &ImportTable,
) -> Option<Occurrence> {
    let mut text = String::new();
    let mut arguments = Vec::new();

    for operand in operands {
        if grammar.is_string(*operand) {
            let segments = (grammar.segments)(node_text(*operand, source))?;
            let first_index = arguments.len() + 1;
            text.push_str(&fold_segments(&segments, first_index, &mut arguments));
        } else {
            arguments.push(node_text(*operand, source).trim().to_string());
            text.push_str(&format!("%{}$s", arguments.len()));
        }
    }

    emit(grammar, chain, text, arguments, path, source, policy, imports)
}

#[allow(clippy::too_many_arguments)]
fn emit(
    grammar: &CodeGrammar,
    node: Node<'_>,
    text: String,
    arguments: Vec<String>,
    path: &Path,
    source: &str,
    policy: &SkipPolicy,
    imports: &ImportTable,
) -> Option<Occurrence> {
    let mut context = syntactic_context(grammar, node, source, imports);
    context.path = Some(path);
    context.argument_count = arguments.len();

    if let Some(reason) = policy.skip_reason(&text, &context) {
        tracing::trace!(text = %text, ?reason, "skipped literal");
        return None;
    }

    let raw = node_text(node, source);
    Some(Occurrence {
        raw: raw.to_string(),
        text,
        path: path.to_path_buf(),
        line: line_number(source, node.start_byte()),
        dialect: grammar.dialect,
        arguments,
        handle: Handle::new(path, node.byte_range(), raw, 0),
    })
}
