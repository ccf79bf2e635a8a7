use tree_sitter::Node;

use super::code::CodeGrammar;
use crate::core::{
    skip_policy::SyntacticContext,
    syntax::{imports::ImportTable, node::ancestors},
};

/// Annotation, call, and receiver around an emitted node.
///
/// The call is found by climbing through argument wrappers only, so a literal
/// nested in a lambda passed to `log(...)` is not treated as a `log` argument.
pub(super) fn syntactic_context<'a>(
    grammar: &CodeGrammar,
    node: Node<'_>,
    source: &str,
    imports: &ImportTable,
) -> SyntacticContext<'a> {
    let in_annotation = ancestors(node).any(|a| grammar.annotation_kinds.contains(&a.kind()));

    let mut context = SyntacticContext {
        in_annotation,
        ..Default::default()
    };

    let mut child = node;
    for parent in ancestors(node) {
        if grammar.call_kinds.contains(&parent.kind()) {
            if let Some(callee) = (grammar.callee)(parent, child, source) {
                context.receiver = callee
                    .receiver
                    .map(|receiver| resolve_receiver(&receiver, imports));
                context.call_name = Some(callee.name);
            }
            break;
        }
        if !grammar.transparent_kinds.contains(&parent.kind()) {
            break;
        }
        child = parent;
    }

    context
}

/// Qualify a simple receiver name through the file's imports.
fn resolve_receiver(receiver: &str, imports: &ImportTable) -> String {
    if receiver.contains('.') {
        return receiver.to_string();
    }
    imports
        .resolve(receiver)
        .map(str::to_string)
        .unwrap_or_else(|| receiver.to_string())
}

/// Split callee text like `Log.d` or `binding?.title.setText` into receiver and name.
pub(super) fn split_callee(text: &str) -> Option<(Option<String>, String)> {
    let text = strip_type_arguments(text.trim());
    let (receiver, name) = match text.rsplit_once('.') {
        Some((receiver, name)) => (
            Some(receiver.trim_end_matches(['?', '!']).trim().to_string()),
            name,
        ),
        None => (None, text.as_str()),
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((receiver.filter(|r| !r.is_empty()), name.to_string()))
}

fn strip_type_arguments(text: &str) -> String {
    match text.find('<') {
        Some(start) if text.ends_with('>') => text[..start].to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_callee() {
        assert_eq!(split_callee("show"), Some((None, "show".to_string())));
        assert_eq!(
            split_callee("Log.d"),
            Some((Some("Log".to_string()), "d".to_string()))
        );
        assert_eq!(
            split_callee("binding?.title.setText"),
            Some((Some("binding?.title".to_string()), "setText".to_string()))
        );
        assert_eq!(
            split_callee("listOf<String>"),
            Some((None, "listOf".to_string()))
        );
        assert_eq!(split_callee("{ x }"), None);
    }

    #[test]
    fn test_resolve_receiver() {
        let imports = ImportTable::parse("import android.util.Log\n");
        assert_eq!(resolve_receiver("Log", &imports), "android.util.Log");
        assert_eq!(resolve_receiver("Other", &imports), "Other");
        assert_eq!(resolve_receiver("a.b.C", &imports), "a.b.C");
    }
}
