//! Live source documents.
//!
//! A `Document` owns the current text of one file, the log of edits applied
//! since it was loaded, and (for code dialects) a tree-sitter tree kept in
//! sync through incremental reparsing. Handles taken at any generation can be
//! mapped forward through the edit log and re-validated before use.

use std::{
    collections::BTreeMap,
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use tree_sitter::{InputEdit, Point, Tree};

use super::{Dialect, Handle, parse_code};

/// One applied text edit, in the coordinates of the text it was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edit {
    start: usize,
    old_len: usize,
    new_len: usize,
}

impl Edit {
    /// Map a range forward through this edit. `None` when the edit overlaps it.
    fn map(&self, range: &Range<usize>) -> Option<Range<usize>> {
        let old_end = self.start + self.old_len;
        if range.end <= self.start {
            return Some(range.clone());
        }
        if range.start >= old_end {
            let shift = |offset: usize| offset - self.old_len + self.new_len;
            return Some(shift(range.start)..shift(range.end));
        }
        None
    }
}

pub struct Document {
    path: PathBuf,
    dialect: Dialect,
    text: String,
    edits: Vec<Edit>,
    tree: Option<Tree>,
    needs_reparse: bool,
}

/// Borrowed view of a parsed document.
pub struct ParsedView<'a> {
    pub tree: &'a Tree,
    pub source: &'a str,
}

impl Document {
    /// Load a document from disk. The dialect is taken from the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let dialect = Dialect::from_path(path)
            .ok_or_else(|| anyhow!("Unsupported file type: {}", path.display()))?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Ok(Self::from_text(path, dialect, text))
    }

    pub fn from_text(path: &Path, dialect: Dialect, text: String) -> Self {
        Self {
            path: path.to_path_buf(),
            dialect,
            text,
            edits: Vec::new(),
            tree: None,
            needs_reparse: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of edits applied so far.
    pub fn generation(&self) -> usize {
        self.edits.len()
    }

    pub fn is_dirty(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Take a handle to `range` at the current generation.
    pub fn handle(&self, range: Range<usize>) -> Handle {
        let fingerprint = self.text.get(range.clone()).unwrap_or_default();
        Handle::new(&self.path, range, fingerprint, self.generation())
    }

    /// Current range of a handle, or `None` if the handle went stale.
    ///
    /// A handle is stale when it belongs to another file, when an edit since
    /// its generation overlapped the node, or when the text at the mapped
    /// range no longer equals the fingerprint.
    pub fn resolve(&self, handle: &Handle) -> Option<Range<usize>> {
        if handle.path() != self.path || handle.generation() > self.generation() {
            return None;
        }
        let mut range = handle.range();
        for edit in &self.edits[handle.generation()..] {
            range = edit.map(&range)?;
        }
        match self.text.get(range.clone()) {
            Some(current) if current == handle.fingerprint() => Some(range),
            _ => None,
        }
    }

    /// Replace `range` with `replacement` and return a handle to the new text.
    pub fn replace(&mut self, range: Range<usize>, replacement: &str) -> Result<Handle> {
        if range.start > range.end
            || range.end > self.text.len()
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return Err(anyhow!(
                "Invalid edit range {}..{} in {}",
                range.start,
                range.end,
                self.path.display()
            ));
        }

        let start_position = point_at(&self.text, range.start);
        let old_end_position = point_at(&self.text, range.end);

        self.text.replace_range(range.clone(), replacement);
        let new_end = range.start + replacement.len();
        let new_end_position = point_at(&self.text, new_end);

        if let Some(tree) = self.tree.as_mut() {
            tree.edit(&InputEdit {
                start_byte: range.start,
                old_end_byte: range.end,
                new_end_byte: new_end,
                start_position,
                old_end_position,
                new_end_position,
            });
            self.needs_reparse = true;
        }

        self.edits.push(Edit {
            start: range.start,
            old_len: range.len(),
            new_len: replacement.len(),
        });

        Ok(self.handle(range.start..new_end))
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.replace(offset..offset, text).map(|_| ())
    }

    /// Parse (or incrementally reparse) the document and borrow the tree.
    pub fn parsed(&mut self) -> Result<ParsedView<'_>> {
        if self.tree.is_none() || self.needs_reparse {
            let tree = parse_code(self.dialect, &self.text, self.tree.as_ref())?;
            self.tree = Some(tree);
            self.needs_reparse = false;
        }
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| anyhow!("No syntax tree for {}", self.path.display()))?;
        Ok(ParsedView {
            tree,
            source: &self.text,
        })
    }

    /// Write the current text back to disk.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.text)
            .with_context(|| format!("Failed to write file: {}", self.path.display()))
    }
}

/// Row/column point of a byte offset.
fn point_at(text: &str, offset: usize) -> Point {
    let prefix = &text.as_bytes()[..offset.min(text.len())];
    let row = prefix.iter().filter(|b| **b == b'\n').count();
    let line_start = prefix
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    Point {
        row,
        column: prefix.len() - line_start,
    }
}

/// Documents touched during one commit, keyed by path.
#[derive(Default)]
pub struct DocumentStore {
    documents: BTreeMap<PathBuf, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the document for `path`, loading it from disk on first access.
    pub fn open(&mut self, path: &Path) -> Result<&mut Document> {
        if !self.documents.contains_key(path) {
            let document = Document::load(path)?;
            self.documents.insert(path.to_path_buf(), document);
        }
        self.documents
            .get_mut(path)
            .ok_or_else(|| anyhow!("Document not loaded: {}", path.display()))
    }

    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.documents.get(path)
    }

    /// Save every edited document. Returns one error message per failed file.
    pub fn save_dirty(&self) -> Vec<String> {
        self.documents
            .values()
            .filter(|doc| doc.is_dirty())
            .filter_map(|doc| doc.save().err().map(|err| format!("{:#}", err)))
            .collect()
    }
}
