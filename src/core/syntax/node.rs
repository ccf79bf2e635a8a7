//! Tree-sitter traversal helpers shared by the scanner and the rewriter.

use std::ops::Range;

use tree_sitter::Node;

/// Source text of a node.
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Parents of `node`, nearest first.
pub fn ancestors(node: Node<'_>) -> impl Iterator<Item = Node<'_>> {
    std::iter::successors(node.parent(), |n| n.parent())
}

pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// First direct child whose kind is one of `kinds`.
pub fn child_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    children(node).into_iter().find(|c| kinds.contains(&c.kind()))
}

/// True when the node has an anonymous child token equal to `token`.
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    children(node)
        .iter()
        .any(|c| !c.is_named() && c.kind() == token)
}

/// Outermost node spanning exactly `range`.
pub fn node_at_range<'t>(root: Node<'t>, range: &Range<usize>) -> Option<Node<'t>> {
    let mut node = root.descendant_for_byte_range(range.start, range.end)?;
    if node.byte_range() != *range {
        node = std::iter::once(node)
            .chain(ancestors(node))
            .find(|n| n.byte_range() == *range)?;
    }
    while let Some(parent) = node.parent() {
        if parent.byte_range() != *range {
            break;
        }
        node = parent;
    }
    Some(node)
}

/// Depth-first pre-order walk, descending only where `visit` returns true.
pub fn walk_preorder<'t>(root: Node<'t>, visit: &mut impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let descend = visit(node);
        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Name of a declaration node (function, class, property).
///
/// Looks at the `name` field first, then the first identifier-like child.
pub fn declaration_name<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(name, source));
    }
    child_of_kind(
        node,
        &["identifier", "simple_identifier", "type_identifier"],
    )
    .map(|n| node_text(n, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::syntax::{Dialect, parse_code};

    #[test]
    fn test_node_at_range_finds_literal() {
        let source = "fun f() { g(\"Hi\") }";
        let tree = parse_code(Dialect::Kotlin, source, None).unwrap();
        let start = source.find('"').unwrap();
        let node = node_at_range(tree.root_node(), &(start..start + 4)).unwrap();
        assert_eq!(node_text(node, source), "\"Hi\"");
    }

    #[test]
    fn test_walk_preorder_can_prune() {
        let source = "class A { fun f() {} }";
        let tree = parse_code(Dialect::Kotlin, source, None).unwrap();
        let mut kinds = Vec::new();
        walk_preorder(tree.root_node(), &mut |node| {
            kinds.push(node.kind().to_string());
            node.kind() != "class_declaration"
        });
        assert!(kinds.contains(&"class_declaration".to_string()));
        assert!(!kinds.contains(&"function_declaration".to_string()));
    }

    #[test]
    fn test_declaration_name_java() {
        let source = "class Main { void run() {} }";
        let tree = parse_code(Dialect::Java, source, None).unwrap();
        let class = tree.root_node().named_child(0).unwrap();
        assert_eq!(declaration_name(class, source), Some("Main"));
    }
}
