//! Literal scanning.
//!
//! Each dialect implements [`LiteralDialect`]: it detects occurrences in a
//! file and knows how to spell a resource lookup in that file. Dispatch goes
//! through the closed [`DialectHandler`] enum.
//!
//! ## Module Structure
//!
//! - `code`: tree walker shared by the Kotlin and Java grammars
//! - `context`: syntactic context of a literal (annotation, call, receiver)
//! - `kotlin` / `java` / `markup`: per-dialect handlers

mod code;
mod context;
pub mod java;
pub mod kotlin;
pub mod markup;

use std::{
    collections::HashSet,
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use enum_dispatch::enum_dispatch;
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    config::Config,
    core::{
        rewrite::expression::{Access, ExpressionRequest},
        skip_policy::SkipPolicy,
        syntax::{Dialect, Document, Handle},
    },
};

pub use java::JavaDialect;
pub use kotlin::KotlinDialect;
pub use markup::MarkupDialect;

/// One concrete literal usage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Source text of the replaced node.
    pub raw: String,
    /// Normalized text with `%k$s` placeholders for arguments.
    pub text: String,
    pub path: PathBuf,
    pub line: usize,
    pub dialect: Dialect,
    /// Source text of the non-literal parts, in order.
    pub arguments: Vec<String>,
    #[serde(skip)]
    pub handle: Handle,
}

impl Occurrence {
    pub fn range(&self) -> Range<usize> {
        self.handle.range()
    }
}

#[enum_dispatch]
pub trait LiteralDialect {
    fn dialect(&self) -> Dialect;

    /// Find extractable occurrences in `source`, ordered by offset.
    fn detect(&self, path: &Path, source: &str, policy: &SkipPolicy) -> Result<Vec<Occurrence>>;

    /// How code at `range` reaches the string table.
    fn access(
        &self,
        document: &mut Document,
        range: &Range<usize>,
        fallback_prefix: &str,
    ) -> Result<Access>;

    /// Fully qualified replacement expression.
    fn build_expression(&self, request: &ExpressionRequest) -> Result<String>;

    /// Import statement for `fq_name`, `None` when the dialect has no imports.
    fn import_statement(&self, fq_name: &str) -> Option<String>;
}

#[enum_dispatch(LiteralDialect)]
pub enum DialectHandler {
    Kotlin(KotlinDialect),
    Java(JavaDialect),
    Markup(MarkupDialect),
}

impl DialectHandler {
    pub fn new(dialect: Dialect, config: &Config) -> Self {
        match dialect {
            Dialect::Kotlin => KotlinDialect.into(),
            Dialect::Java => JavaDialect.into(),
            Dialect::Markup => MarkupDialect::new(&config.text_attributes).into(),
        }
    }
}

/// Scan one file.
pub fn scan_file(path: &Path, config: &Config, policy: &SkipPolicy) -> Result<Vec<Occurrence>> {
    let dialect = Dialect::from_path(path)
        .ok_or_else(|| anyhow!("Unsupported file type: {}", path.display()))?;
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let handler = DialectHandler::new(dialect, config);
    let occurrences = handler.detect(path, &source, policy)?;
    Ok(dedup_by_node(occurrences))
}

/// A file that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

pub struct ScanBatch {
    pub occurrences: Vec<Occurrence>,
    pub errors: Vec<ScanError>,
}

/// Scan files in parallel. Output is ordered by path, then offset.
pub fn scan_files(paths: &[PathBuf], config: &Config, policy: &SkipPolicy) -> ScanBatch {
    let results: Vec<(PathBuf, Result<Vec<Occurrence>>)> = paths
        .par_iter()
        .map(|path| (path.clone(), scan_file(path, config, policy)))
        .collect();

    let mut occurrences = Vec::new();
    let mut errors = Vec::new();
    for (path, result) in results {
        match result {
            Ok(found) => occurrences.extend(found),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "scan failed");
                errors.push(ScanError {
                    path,
                    message: format!("{:#}", err),
                });
            }
        }
    }

    occurrences.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.range().start.cmp(&b.range().start))
    });
    errors.sort_by(|a, b| a.path.cmp(&b.path));

    ScanBatch {
        occurrences,
        errors,
    }
}

/// Drop records pointing at a node that already produced one.
fn dedup_by_node(occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
    let mut seen: HashSet<Range<usize>> = HashSet::new();
    let mut unique: Vec<Occurrence> = occurrences
        .into_iter()
        .filter(|o| seen.insert(o.range()))
        .collect();
    unique.sort_by_key(|o| o.range().start);
    unique
}
