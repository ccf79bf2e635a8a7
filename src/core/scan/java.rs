use std::{ops::Range, path::Path};

use anyhow::{Result, anyhow};
use tree_sitter::Node;

use super::{
    LiteralDialect, Occurrence,
    code::{self, Callee, CodeGrammar},
    context::split_callee,
};
use crate::core::{
    rewrite::{
        context_access::access_prefix,
        expression::{Access, ExpressionRequest, code_expression, validate_expression},
    },
    skip_policy::SkipPolicy,
    syntax::{
        Dialect, Document,
        literal::{Segment, java_value},
        node::{node_at_range, node_text},
    },
};

const GRAMMAR: CodeGrammar = CodeGrammar {
    dialect: Dialect::Java,
    string_kinds: &["string_literal"],
    concat_kinds: &["binary_expression"],
    call_kinds: &[
        "method_invocation",
        "object_creation_expression",
        "explicit_constructor_invocation",
    ],
    annotation_kinds: &[
        "annotation",
        "marker_annotation",
        "annotation_argument_list",
        "element_value_pair",
    ],
    transparent_kinds: &["argument_list", "parenthesized_expression"],
    parenthesized_kinds: &["parenthesized_expression"],
    skipped_kinds: &["package_declaration", "import_declaration"],
    segments: java_segments,
    callee: java_callee,
};

fn java_segments(raw: &str) -> Option<Vec<Segment>> {
    java_value(raw).map(|value| vec![Segment::Text(value)])
}

fn java_callee(call: Node<'_>, child: Node<'_>, source: &str) -> Option<Callee> {
    if call.child_by_field_name("object") == Some(child) {
        return None;
    }
    match call.kind() {
        "method_invocation" => {
            let name = call.child_by_field_name("name")?;
            Some(Callee {
                name: node_text(name, source).to_string(),
                receiver: call
                    .child_by_field_name("object")
                    .map(|object| node_text(object, source).to_string()),
            })
        }
        "object_creation_expression" => {
            let ty = call.child_by_field_name("type")?;
            let (_, name) = split_callee(node_text(ty, source))?;
            Some(Callee {
                name,
                receiver: None,
            })
        }
        _ => None,
    }
}

/// Java sources. Java code is always imperative.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaDialect;

impl LiteralDialect for JavaDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Java
    }

    fn detect(&self, path: &Path, source: &str, policy: &SkipPolicy) -> Result<Vec<Occurrence>> {
        code::detect(&GRAMMAR, path, source, policy)
    }

    fn access(
        &self,
        document: &mut Document,
        range: &Range<usize>,
        fallback_prefix: &str,
    ) -> Result<Access> {
        let view = document.parsed()?;
        let node = node_at_range(view.tree.root_node(), range)
            .ok_or_else(|| anyhow!("No syntax node at {}..{}", range.start, range.end))?;
        Ok(Access::Imperative {
            prefix: access_prefix(node, view.source, fallback_prefix),
        })
    }

    fn build_expression(&self, request: &ExpressionRequest) -> Result<String> {
        let expression = code_expression(request);
        validate_expression(Dialect::Java, &expression)?;
        Ok(expression)
    }

    fn import_statement(&self, fq_name: &str) -> Option<String> {
        Some(format!("import {};", fq_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Vec<Occurrence> {
        JavaDialect
            .detect(
                Path::new("app/src/main/java/com/example/Main.java"),
                source,
                &SkipPolicy::default(),
            )
            .unwrap()
    }

    fn wrap(body: &str) -> String {
        format!("package com.example;\n\nclass Main {{\n    void run() {{\n        {}\n    }}\n}}\n", body)
    }

    #[test]
    fn test_plain_literal() {
        let found = scan(&wrap("title.setText(\"Welcome back\");"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Welcome back");
        assert_eq!(found[0].line, 5);
        assert_eq!(found[0].dialect, Dialect::Java);
    }

    #[test]
    fn test_concatenation_folding() {
        let found = scan(&wrap("show(\"id=\" + userId + \"!\");"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "id=%1$s!");
        assert_eq!(found[0].arguments, vec!["userId"]);
    }

    #[test]
    fn test_pure_variable_concatenation_is_ignored() {
        assert!(scan(&wrap("show(a + b);")).is_empty());
    }

    #[test]
    fn test_parenthesized_arithmetic_is_one_argument() {
        let found = scan(&wrap("show(\"Count: \" + (a + b));"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Count: %1$s");
        assert_eq!(found[0].arguments, vec!["(a + b)"]);
    }

    #[test]
    fn test_leading_arithmetic_is_one_argument() {
        let found = scan(&wrap("show(a + b + \" in total\");"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "%1$s in total");
        assert_eq!(found[0].arguments, vec!["a + b"]);
    }

    #[test]
    fn test_parenthesized_string_chain_is_flattened() {
        let found = scan(&wrap("show(\"Total: \" + (count + \" items\"));"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Total: %1$s items");
        assert_eq!(found[0].arguments, vec!["count"]);
    }

    #[test]
    fn test_log_calls_are_skipped() {
        let found = scan(&wrap("Log.e(TAG, \"Failed to load\"); Timber.w(\"Retrying now\");"));
        assert!(found.is_empty());
    }

    #[test]
    fn test_annotation_is_skipped() {
        let source = "class Main {\n    @SuppressWarnings(\"unchecked\")\n    void run() {}\n}\n";
        assert!(scan(source).is_empty());
    }

    #[test]
    fn test_escapes_are_decoded() {
        let found = scan(&wrap("show(\"Say \\\"hi\\\"\");"));
        assert_eq!(found[0].text, "Say \"hi\"");
    }

    #[test]
    fn test_receiver_literal_is_not_an_argument() {
        let found = scan(&wrap("boolean same = \"Ready now\".equals(state);"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Ready now");
    }
}
