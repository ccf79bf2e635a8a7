//! Syntax access for the supported source dialects.
//!
//! This module is the only place that knows how a file becomes a tree:
//! - `Dialect`: which grammar (or markup tokenizer) a file uses
//! - `Handle`: a relocatable reference to a node captured at scan time
//! - `document`: live file text with an edit log and incremental reparsing
//! - `imports`: package and import headers
//! - `literal`: decoding of Kotlin/Java string literal source text
//! - `node`: small tree-sitter traversal helpers

pub mod document;
pub mod imports;
pub mod literal;
pub mod node;

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tree_sitter::{Language, Parser, Tree};

pub use document::{Document, DocumentStore};

/// Source dialect of a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dialect {
    Kotlin,
    Java,
    /// Android layout, menu, or manifest XML.
    Markup,
}

impl Dialect {
    /// Detect the dialect from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kt" | "kts" => Some(Dialect::Kotlin),
            "java" => Some(Dialect::Java),
            "xml" => Some(Dialect::Markup),
            _ => None,
        }
    }

    /// Tree-sitter grammar for code dialects. Markup has none.
    pub fn language(self) -> Option<Language> {
        match self {
            Dialect::Kotlin => Some(tree_sitter_kotlin_ng::LANGUAGE.into()),
            Dialect::Java => Some(tree_sitter_java::LANGUAGE.into()),
            Dialect::Markup => None,
        }
    }

    pub fn is_code(self) -> bool {
        !matches!(self, Dialect::Markup)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Kotlin => write!(f, "Kotlin"),
            Dialect::Java => write!(f, "Java"),
            Dialect::Markup => write!(f, "XML"),
        }
    }
}

/// Parse code text, reusing `old_tree` when it has been edited to match `text`.
pub fn parse_code(dialect: Dialect, text: &str, old_tree: Option<&Tree>) -> Result<Tree> {
    let language = dialect
        .language()
        .ok_or_else(|| anyhow!("{} files have no syntax grammar", dialect))?;
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .with_context(|| format!("Failed to load {} grammar", dialect))?;
    parser
        .parse(text, old_tree)
        .ok_or_else(|| anyhow!("Failed to parse {} source", dialect))
}

/// Relocatable reference to a syntax node.
///
/// A handle remembers the node's byte range and source text at the document
/// generation it was taken from. `Document::resolve` maps it through later
/// edits and refuses it once an edit touched the node or the text changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    path: PathBuf,
    range: Range<usize>,
    fingerprint: String,
    generation: usize,
}

impl Handle {
    pub fn new(path: &Path, range: Range<usize>, fingerprint: &str, generation: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            range,
            fingerprint: fingerprint.to_string(),
            generation,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn generation(&self) -> usize {
        self.generation
    }
}

/// 1-based line number of a byte offset.
pub fn line_number(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// 1-based column (in characters) of a byte offset.
pub fn column_number(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    let line_start = text[..end].rfind('\n').map(|i| i + 1).unwrap_or(0);
    text.get(line_start..end)
        .map(|prefix| prefix.chars().count() + 1)
        .unwrap_or(1)
}

/// Full text of the 1-based line.
pub fn line_text(text: &str, line: usize) -> &str {
    text.lines().nth(line.saturating_sub(1)).unwrap_or("")
}
