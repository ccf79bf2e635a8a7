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
        declarative::is_declarative,
        expression::{Access, ExpressionRequest, code_expression, validate_expression},
    },
    skip_policy::SkipPolicy,
    syntax::{
        Dialect, Document,
        literal::kotlin_segments,
        node::{node_at_range, node_text},
    },
};

const GRAMMAR: CodeGrammar = CodeGrammar {
    dialect: Dialect::Kotlin,
    string_kinds: &[
        "string_literal",
        "line_string_literal",
        "multi_line_string_literal",
        "multiline_string_literal",
    ],
    concat_kinds: &["additive_expression", "binary_expression"],
    call_kinds: &["call_expression"],
    annotation_kinds: &["annotation", "file_annotation"],
    transparent_kinds: &[
        "value_argument",
        "value_arguments",
        "call_suffix",
        "parenthesized_expression",
    ],
    parenthesized_kinds: &["parenthesized_expression"],
    skipped_kinds: &["package_header", "import", "import_header", "import_list"],
    segments: kotlin_segments,
    callee: kotlin_callee,
};

fn kotlin_callee(call: Node<'_>, child: Node<'_>, source: &str) -> Option<Callee> {
    let callee = call.named_child(0)?;
    if callee == child {
        return None;
    }
    let (receiver, name) = split_callee(node_text(callee, source))?;
    Some(Callee { name, receiver })
}

/// Kotlin sources, including Compose code.
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinDialect;

impl LiteralDialect for KotlinDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Kotlin
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
        if is_declarative(node, view.source) {
            return Ok(Access::Declarative);
        }
        Ok(Access::Imperative {
            prefix: access_prefix(node, view.source, fallback_prefix),
        })
    }

    fn build_expression(&self, request: &ExpressionRequest) -> Result<String> {
        let expression = code_expression(request);
        validate_expression(Dialect::Kotlin, &expression)?;
        Ok(expression)
    }

    fn import_statement(&self, fq_name: &str) -> Option<String> {
        Some(format!("import {}", fq_name))
    }
}
