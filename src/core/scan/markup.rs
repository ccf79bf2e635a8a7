use std::{ops::Range, path::Path, sync::LazyLock};

use anyhow::{Result, anyhow};
use quick_xml::{Reader, escape::unescape, events::Event};
use regex::Regex;

use super::{LiteralDialect, Occurrence};
use crate::core::{
    resources::escape::decode_value,
    rewrite::expression::{Access, ExpressionRequest, markup_reference},
    skip_policy::{SkipPolicy, SyntacticContext},
    syntax::{Dialect, Document, Handle, line_number},
};

/// `name="value"` or `name='value'` inside a start tag.
static ATTRIBUTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([\w:.-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Layout, menu, and manifest XML.
#[derive(Debug, Clone)]
pub struct MarkupDialect {
    text_attributes: Vec<String>,
}

impl MarkupDialect {
    pub fn new(text_attributes: &[String]) -> Self {
        Self {
            text_attributes: text_attributes.to_vec(),
        }
    }

    /// Text attributes of one start tag. `offset` is the tag's position in the file.
    fn scan_tag(
        &self,
        tag: &str,
        offset: usize,
        path: &Path,
        source: &str,
        policy: &SkipPolicy,
        out: &mut Vec<Occurrence>,
    ) {
        for caps in ATTRIBUTE_REGEX.captures_iter(tag) {
            let Some(name) = caps.get(1) else { continue };
            if !self.text_attributes.iter().any(|a| a == name.as_str()) {
                continue;
            }
            let Some(value) = caps.get(2).or_else(|| caps.get(3)) else {
                continue;
            };
            let raw = value.as_str();
            if is_resource_reference(raw) || raw.trim().is_empty() {
                continue;
            }
            let text = match unescape(raw) {
                Ok(unescaped) => decode_value(&unescaped),
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "bad attribute value");
                    continue;
                }
            };

            let context = SyntacticContext {
                path: Some(path),
                ..Default::default()
            };
            if policy.should_skip(&text, &context) {
                continue;
            }

            let range: Range<usize> = offset + value.start()..offset + value.end();
            out.push(Occurrence {
                raw: raw.to_string(),
                text,
                path: path.to_path_buf(),
                line: line_number(source, range.start),
                dialect: Dialect::Markup,
                arguments: Vec::new(),
                handle: Handle::new(path, range, raw, 0),
            });
        }
    }
}

/// `@string/x`, `@{binding}`, `?attr/x` and friends are already externalized.
fn is_resource_reference(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with('@') || value.starts_with('?')
}

/// The tag ending at `end`. `<` cannot appear unescaped inside attribute values.
pub(crate) fn tag_before(source: &str, end: usize) -> Option<(usize, &str)> {
    let head = source.get(..end)?;
    let start = head.rfind('<')?;
    Some((start, &head[start..]))
}

impl LiteralDialect for MarkupDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Markup
    }

    fn detect(&self, path: &Path, source: &str, policy: &SkipPolicy) -> Result<Vec<Occurrence>> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();
        let mut occurrences = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(_)) | Ok(Event::Empty(_)) => {
                    let end = reader.buffer_position() as usize;
                    if let Some((start, tag)) = tag_before(source, end) {
                        self.scan_tag(tag, start, path, source, policy, &mut occurrences);
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(anyhow!(
                        "XML error at position {}: {}",
                        reader.error_position(),
                        err
                    ));
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(occurrences)
    }

    fn access(&self, _: &mut Document, _: &Range<usize>, _: &str) -> Result<Access> {
        Ok(Access::Markup)
    }

    fn build_expression(&self, request: &ExpressionRequest) -> Result<String> {
        Ok(markup_reference(request.key))
    }

    fn import_statement(&self, _: &str) -> Option<String> {
        None
    }
}
