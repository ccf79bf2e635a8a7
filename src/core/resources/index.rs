use std::{
    collections::{BTreeMap, HashSet, btree_map},
    path::{Path, PathBuf},
};

use anyhow::Result;
use regex::Regex;
use walkdir::WalkDir;

use super::ResourceTable;
use crate::{
    config::SKIPPED_DIR_NAMES,
    core::syntax::{Dialect, DocumentStore},
};

/// Every `res/values*/strings*.xml` table of a project: the primary table
/// plus translations and per-module tables.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    tables: Vec<PathBuf>,
}

impl ResourceIndex {
    pub fn discover(root: &Path) -> Self {
        let mut tables: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| {
                !(e.file_type().is_dir()
                    && SKIPPED_DIR_NAMES.contains(&e.file_name().to_string_lossy().as_ref()))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_string_table(e.path()))
            .map(|e| e.into_path())
            .collect();
        tables.sort();
        Self { tables }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.tables
    }

    /// Keys defined in any table. Unreadable tables are skipped.
    pub fn keys(&self) -> HashSet<String> {
        let mut keys = HashSet::new();
        for path in &self.tables {
            match ResourceTable::open(path) {
                Ok(table) => keys.extend(table.keys().map(str::to_string)),
                Err(err) => tracing::warn!(error = %err, "skipping string table"),
            }
        }
        keys
    }

    /// Rename `old` in every table except `primary`. Edits stay in `pending`
    /// until it is saved. Returns one message per failure.
    pub fn rename_in_translations(
        &self,
        primary: &Path,
        old: &str,
        new: &str,
        pending: &mut PendingTables,
    ) -> Vec<String> {
        let mut errors = Vec::new();
        for path in self.tables.iter().filter(|p| p.as_path() != primary) {
            let table = match pending.tables.entry(path.clone()) {
                btree_map::Entry::Occupied(entry) => entry.into_mut(),
                btree_map::Entry::Vacant(entry) => match ResourceTable::open(path) {
                    Ok(table) => entry.insert(table),
                    Err(err) => {
                        errors.push(err.to_string());
                        continue;
                    }
                },
            };
            if let Err(err) = table.rename_key(old, new) {
                errors.push(err.to_string());
            }
        }
        errors
    }
}

/// Translation tables edited in memory and written together.
#[derive(Debug, Default)]
pub struct PendingTables {
    tables: BTreeMap<PathBuf, ResourceTable>,
}

impl PendingTables {
    /// Write every edited table. Returns one message per failure.
    pub fn save(self) -> Vec<String> {
        let mut errors = Vec::new();
        for (_, mut table) in self.tables {
            if !table.is_dirty() {
                continue;
            }
            if let Err(err) = table.save() {
                errors.push(err.to_string());
            }
        }
        errors
    }
}

/// `strings*.xml` directly inside a `values*` directory of a `res` directory.
pub fn is_string_table(path: &Path) -> bool {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let Some(values) = path.parent() else {
        return false;
    };
    let values_name = values.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let res_name = values
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");
    file_name.starts_with("strings") && file_name.ends_with(".xml")
        && values_name.starts_with("values")
        && res_name == "res"
}

/// Rewrite `R.string.old` and `@string/old` to `new` in `files`.
///
/// Edits go through `store` so handles taken at scan time stay resolvable.
/// Returns the number of rewritten references.
pub fn rename_references(
    store: &mut DocumentStore,
    files: &[PathBuf],
    old: &str,
    new: &str,
) -> Result<usize> {
    let code_ref = Regex::new(&format!(r"\bR\.string\.{}\b", regex::escape(old)))?;
    let markup_ref = Regex::new(&format!(r"@string/{}\b", regex::escape(old)))?;
    let mut renamed = 0;

    for path in files {
        if is_string_table(path) {
            continue;
        }
        let Some(dialect) = Dialect::from_path(path) else {
            continue;
        };
        let (pattern, replacement) = match dialect {
            Dialect::Markup => (&markup_ref, format!("@string/{}", new)),
            Dialect::Kotlin | Dialect::Java => (&code_ref, format!("R.string.{}", new)),
        };

        let document = store.open(path)?;
        let ranges: Vec<_> = pattern
            .find_iter(document.text())
            .map(|m| m.range())
            .collect();
        // Back to front so earlier ranges stay valid.
        for range in ranges.into_iter().rev() {
            document.replace(range, &replacement)?;
            renamed += 1;
        }
    }

    Ok(renamed)
}
