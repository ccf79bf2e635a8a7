//! The persisted string table (`res/values/strings.xml`).
//!
//! The table is edited textually: entries are located with `quick-xml`, and
//! inserts, updates, and renames splice the file text so comments and
//! formatting of untouched entries survive.

pub mod escape;
pub mod index;

use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use quick_xml::{Reader, escape::unescape, events::Event};
use regex::Regex;
use thiserror::Error;

use crate::core::scan::markup::tag_before;
use escape::{decode_value, escape_value};

/// Where an existing table is looked for, relative to the project root.
pub const TABLE_SEARCH_PATHS: &[&str] = &[
    "app/src/main/res/values/strings.xml",
    "src/main/res/values/strings.xml",
];

/// Where a missing table is created.
pub const DEFAULT_TABLE_PATH: &str = "app/src/main/res/values/strings.xml";

const EMPTY_TABLE: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n</resources>\n";

const ENTRY_INDENT: &str = "    ";

static NAME_ATTRIBUTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

static INNER_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot locate or create string table {}: {message}", path.display())]
    Locate { path: PathBuf, message: String },
    #[error("cannot parse string table {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("cannot write string table {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("key `{key}` already exists in {}", path.display())]
    KeyExists { path: PathBuf, key: String },
}

/// One `<string>` element.
#[derive(Debug, Clone)]
pub struct Entry {
    pub key: String,
    /// Decoded text.
    pub value: String,
    element: Range<usize>,
    /// Element content, `None` for `<string name="x"/>`.
    content: Option<Range<usize>>,
    name: Range<usize>,
}

/// Outcome of [`ResourceTable::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ResourceTable {
    path: PathBuf,
    text: String,
    entries: Vec<Entry>,
    dirty: bool,
}

impl ResourceTable {
    /// Existing table under `root`. `strings_file` overrides the search list.
    pub fn locate(root: &Path, strings_file: Option<&str>) -> Option<PathBuf> {
        match strings_file {
            Some(file) => Some(root.join(file)).filter(|p| p.is_file()),
            None => TABLE_SEARCH_PATHS
                .iter()
                .map(|relative| root.join(relative))
                .find(|p| p.is_file()),
        }
    }

    /// Open the table under `root`, creating an empty one when none exists.
    pub fn locate_or_create(root: &Path, strings_file: Option<&str>) -> Result<Self, TableError> {
        if let Some(path) = Self::locate(root, strings_file) {
            return Self::open(&path);
        }

        let path = root.join(strings_file.unwrap_or(DEFAULT_TABLE_PATH));
        let locate_error = |err: std::io::Error| TableError::Locate {
            path: path.clone(),
            message: err.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(locate_error)?;
        }
        fs::write(&path, EMPTY_TABLE).map_err(locate_error)?;
        tracing::debug!(path = %path.display(), "created string table");

        Self::from_text(&path, EMPTY_TABLE.to_string())
    }

    pub fn open(path: &Path) -> Result<Self, TableError> {
        let text = fs::read_to_string(path).map_err(|err| TableError::Locate {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_text(path, text)
    }

    pub fn from_text(path: &Path, text: String) -> Result<Self, TableError> {
        let entries = parse_entries(path, &text)?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|e| e.value.as_str())
    }

    fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// First key whose text equals `text`, ignoring surrounding whitespace.
    pub fn find_key_by_value(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.entries
            .iter()
            .find(|e| e.value.trim() == text)
            .map(|e| e.key.as_str())
    }

    /// Insert `key` with `text`, or update its text. Never duplicates a key.
    pub fn upsert(&mut self, key: &str, text: &str) -> Result<Upsert, TableError> {
        let escaped = escape_value(text);

        if let Some(entry) = self.entry(key) {
            if entry.value == text {
                return Ok(Upsert::Unchanged);
            }
            let (range, replacement) = match &entry.content {
                Some(content) => (content.clone(), escaped),
                None => (
                    entry.element.clone(),
                    format!("<string name=\"{}\">{}</string>", key, escaped),
                ),
            };
            self.splice(range, &replacement)?;
            return Ok(Upsert::Updated);
        }

        let line = format!("{}<string name=\"{}\">{}</string>\n", ENTRY_INDENT, key, escaped);
        let (range, insertion) = self.insertion_point(&line)?;
        self.splice(range, &insertion)?;
        Ok(Upsert::Inserted)
    }

    /// Rename `old` to `new`. Returns false when `old` is not in the table.
    pub fn rename_key(&mut self, old: &str, new: &str) -> Result<bool, TableError> {
        if self.contains_key(new) {
            return Err(TableError::KeyExists {
                path: self.path.clone(),
                key: new.to_string(),
            });
        }
        let Some(range) = self.entry(old).map(|e| e.name.clone()) else {
            return Ok(false);
        };
        self.splice(range, new)?;
        Ok(true)
    }

    pub fn save(&mut self) -> Result<(), TableError> {
        fs::write(&self.path, &self.text).map_err(|err| TableError::Write {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        self.dirty = false;
        Ok(())
    }

    /// Range to replace and its replacement for a new entry line.
    fn insertion_point(&self, line: &str) -> Result<(Range<usize>, String), TableError> {
        if let Some(close) = self.text.rfind("</resources>") {
            let line_start = self.text[..close].rfind('\n').map(|i| i + 1).unwrap_or(0);
            if self.text[line_start..close].trim().is_empty() {
                return Ok((line_start..line_start, line.to_string()));
            }
            return Ok((close..close, format!("\n{}", line)));
        }

        // `<resources/>` has no closing tag to insert before.
        if let Some(start) = self.text.find("<resources") {
            if let Some(end) = self.text[start..].find("/>").map(|i| start + i) {
                return Ok((end..end + 2, format!(">\n{}</resources>", line)));
            }
        }

        Err(TableError::Parse {
            path: self.path.clone(),
            message: "missing <resources> root element".to_string(),
        })
    }

    fn splice(&mut self, range: Range<usize>, replacement: &str) -> Result<(), TableError> {
        self.text.replace_range(range, replacement);
        self.entries = parse_entries(&self.path, &self.text)?;
        self.dirty = true;
        Ok(())
    }
}

/// Locate every top-level `<string>` element.
fn parse_entries(path: &Path, text: &str) -> Result<Vec<Entry>, TableError> {
    let parse_error = |message: String| TableError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    // Open `<string>` element: element start, content start, key, name range.
    let mut open: Option<(usize, usize, String, Range<usize>)> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| parse_error(format!("position {}: {}", reader.error_position(), err)))?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                if depth == 0 && e.name().as_ref() == b"resources" {
                    saw_root = true;
                }
                if depth == 1 && open.is_none() && e.name().as_ref() == b"string" {
                    if let Some((start, key, name)) = string_tag(text, end) {
                        open = Some((start, end, key, name));
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 && e.name().as_ref() == b"resources" {
                    saw_root = true;
                }
                if depth == 1 && e.name().as_ref() == b"string" {
                    if let Some((start, key, name)) = string_tag(text, end) {
                        entries.push(Entry {
                            key,
                            value: String::new(),
                            element: start..end,
                            content: None,
                            name,
                        });
                    }
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let Some((start, content_start, key, name)) = open.take() {
                        let content_end = text[..end].rfind("</").unwrap_or(end);
                        let raw = &text[content_start..content_end];
                        entries.push(Entry {
                            key,
                            value: decode_content(raw),
                            element: start..end,
                            content: Some(content_start..content_end),
                            name,
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(parse_error("missing <resources> root element".to_string()));
    }
    Ok(entries)
}

/// Start offset, key, and key range of the `<string>` tag ending at `end`.
fn string_tag(text: &str, end: usize) -> Option<(usize, String, Range<usize>)> {
    let (start, tag) = tag_before(text, end)?;
    let caps = NAME_ATTRIBUTE_REGEX.captures(tag)?;
    let name = caps.get(1).or_else(|| caps.get(2))?;
    Some((
        start,
        name.as_str().to_string(),
        start + name.start()..start + name.end(),
    ))
}

/// Element content to plain text. Inline markup such as `<b>` or `<xliff:g>` is dropped.
fn decode_content(raw: &str) -> String {
    let stripped = INNER_TAG_REGEX.replace_all(raw, "");
    match unescape(&stripped) {
        Ok(unescaped) => decode_value(&unescaped),
        Err(_) => decode_value(&stripped),
    }
}
